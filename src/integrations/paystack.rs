use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::{
    constants::{PAYSTACK_CURRENCY, PAYSTACK_RECIPIENT_TYPE, PAYSTACK_TRANSFER_SOURCE},
    error::{AppError, Result},
};

// ==================== GATEWAY TRAIT ====================

/// Operations the wallet needs from the payment provider.
#[async_trait::async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Starts a hosted checkout for a deposit.
    async fn initialize_payment(&self, request: &InitializePayment) -> Result<CheckoutSession>;

    async fn resolve_account(&self, account_number: &str, bank_code: &str) -> Result<ResolvedAccount>;

    /// Returns the recipient code used by `initiate_transfer`.
    async fn create_transfer_recipient(&self, request: &TransferRecipient) -> Result<String>;

    async fn initiate_transfer(&self, request: &TransferRequest) -> Result<TransferResult>;

    async fn list_banks(&self) -> Result<Vec<Bank>>;
}

// ==================== REQUEST/RESPONSE TYPES ====================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InitializePayment {
    pub email: String,
    /// Minor units (kobo).
    pub amount: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_url: Option<String>,
    pub reference: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CheckoutSession {
    pub authorization_url: String,
    #[serde(default)]
    pub access_code: Option<String>,
    pub reference: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ResolvedAccount {
    pub account_name: String,
    #[serde(default)]
    pub account_number: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferRecipient {
    #[serde(rename = "type")]
    pub recipient_type: String,
    pub name: String,
    pub account_number: String,
    pub bank_code: String,
    pub currency: String,
}

impl TransferRecipient {
    pub fn nuban(name: &str, account_number: &str, bank_code: &str) -> Self {
        Self {
            recipient_type: PAYSTACK_RECIPIENT_TYPE.to_string(),
            name: name.to_string(),
            account_number: account_number.to_string(),
            bank_code: bank_code.to_string(),
            currency: PAYSTACK_CURRENCY.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferRequest {
    pub source: String,
    /// Minor units (kobo).
    pub amount: i64,
    pub recipient: String,
    pub reason: String,
    pub reference: String,
}

impl TransferRequest {
    pub fn from_balance(amount: i64, recipient: &str, reason: &str, reference: &str) -> Self {
        Self {
            source: PAYSTACK_TRANSFER_SOURCE.to_string(),
            amount,
            recipient: recipient.to_string(),
            reason: reason.to_string(),
            reference: reference.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TransferResult {
    pub transfer_code: String,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Bank {
    pub name: String,
    pub code: String,
}

#[derive(Debug, Deserialize)]
struct RecipientData {
    recipient_code: String,
}

/// Every Paystack response is wrapped as `{status, message, data}`.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    status: bool,
    #[serde(default)]
    message: Option<String>,
    data: Option<T>,
}

fn unwrap_envelope<T>(http_status: StatusCode, envelope: Envelope<T>, action: &str) -> Result<T> {
    let message = envelope
        .message
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| format!("Paystack {} failed", action));

    if !http_status.is_success() || !envelope.status {
        return Err(AppError::Gateway(message));
    }

    envelope
        .data
        .ok_or_else(|| AppError::Gateway(format!("Paystack {} returned no data", action)))
}

// ==================== CLIENT ====================

#[derive(Clone, Debug)]
pub struct PaystackClient {
    client: Client,
    base_url: String,
    secret_key: String,
}

impl PaystackClient {
    pub fn new(base_url: String, secret_key: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
            secret_key,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    async fn read<T: DeserializeOwned>(&self, response: reqwest::Response, action: &str) -> Result<T> {
        let status = response.status();
        let envelope = response.json::<Envelope<T>>().await.map_err(|e| {
            tracing::error!("Paystack {} returned an unreadable body ({}): {}", action, status, e);
            AppError::Gateway(format!("Paystack {} returned an invalid response", action))
        })?;
        unwrap_envelope(status, envelope, action)
    }

    async fn post<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        action: &str,
    ) -> Result<T> {
        let response = self
            .client
            .post(self.endpoint(path))
            .bearer_auth(&self.secret_key)
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::Gateway(format!("Paystack {} request failed: {}", action, e)))?;
        self.read(response, action).await
    }
}

#[async_trait::async_trait]
impl PaymentGateway for PaystackClient {
    async fn initialize_payment(&self, request: &InitializePayment) -> Result<CheckoutSession> {
        tracing::debug!(
            "Paystack initialize reference={} amount_kobo={}",
            request.reference,
            request.amount
        );
        self.post("/transaction/initialize", request, "initialize").await
    }

    async fn resolve_account(&self, account_number: &str, bank_code: &str) -> Result<ResolvedAccount> {
        let response = self
            .client
            .get(self.endpoint("/bank/resolve"))
            .bearer_auth(&self.secret_key)
            .query(&[("account_number", account_number), ("bank_code", bank_code)])
            .send()
            .await
            .map_err(|e| AppError::Gateway(format!("Paystack resolve request failed: {}", e)))?;
        self.read(response, "account resolution").await
    }

    async fn create_transfer_recipient(&self, request: &TransferRecipient) -> Result<String> {
        let data: RecipientData = self
            .post("/transferrecipient", request, "transfer recipient")
            .await?;
        Ok(data.recipient_code)
    }

    async fn initiate_transfer(&self, request: &TransferRequest) -> Result<TransferResult> {
        tracing::debug!(
            "Paystack transfer reference={} amount_kobo={}",
            request.reference,
            request.amount
        );
        self.post("/transfer", request, "transfer").await
    }

    async fn list_banks(&self) -> Result<Vec<Bank>> {
        let response = self
            .client
            .get(self.endpoint("/bank"))
            .bearer_auth(&self.secret_key)
            .query(&[("currency", PAYSTACK_CURRENCY)])
            .send()
            .await
            .map_err(|e| AppError::Gateway(format!("Paystack bank list request failed: {}", e)))?;
        self.read(response, "bank list").await
    }
}
