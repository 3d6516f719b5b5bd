//! Scripted `PaymentGateway` for service tests.

use std::sync::Mutex;

use crate::{
    error::{AppError, Result},
    integrations::{
        Bank, CheckoutSession, InitializePayment, PaymentGateway, ResolvedAccount,
        TransferRecipient, TransferRequest, TransferResult,
    },
};

#[derive(Default)]
pub struct ScriptedGateway {
    fail_initialize: Option<String>,
    fail_resolve: Option<String>,
    fail_recipient: Option<String>,
    fail_transfer: Option<String>,
    transfer_status: Option<String>,
    banks: Vec<Bank>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedGateway {
    pub fn ok() -> Self {
        Self {
            banks: vec![Bank {
                name: "Guaranty Trust Bank".into(),
                code: "058".into(),
            }],
            ..Self::default()
        }
    }

    pub fn failing_initialize(mut self, message: &str) -> Self {
        self.fail_initialize = Some(message.into());
        self
    }

    pub fn failing_resolve(mut self, message: &str) -> Self {
        self.fail_resolve = Some(message.into());
        self
    }

    pub fn failing_recipient(mut self, message: &str) -> Self {
        self.fail_recipient = Some(message.into());
        self
    }

    pub fn failing_transfer(mut self, message: &str) -> Self {
        self.fail_transfer = Some(message.into());
        self
    }

    pub fn with_transfer_status(mut self, status: &str) -> Self {
        self.transfer_status = Some(status.into());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

fn scripted<T>(failure: &Option<String>, value: impl FnOnce() -> T) -> Result<T> {
    match failure {
        Some(message) => Err(AppError::Gateway(message.clone())),
        None => Ok(value()),
    }
}

#[async_trait::async_trait]
impl PaymentGateway for ScriptedGateway {
    async fn initialize_payment(&self, request: &InitializePayment) -> Result<CheckoutSession> {
        self.record(format!("initialize:{}:{}", request.reference, request.amount));
        scripted(&self.fail_initialize, || CheckoutSession {
            authorization_url: format!("https://checkout.paystack.com/{}", request.reference),
            access_code: Some("access".into()),
            reference: request.reference.clone(),
        })
    }

    async fn resolve_account(&self, account_number: &str, bank_code: &str) -> Result<ResolvedAccount> {
        self.record(format!("resolve:{}:{}", account_number, bank_code));
        scripted(&self.fail_resolve, || ResolvedAccount {
            account_name: "ADA OBI".into(),
            account_number: Some(account_number.into()),
        })
    }

    async fn create_transfer_recipient(&self, request: &TransferRecipient) -> Result<String> {
        self.record(format!("recipient:{}", request.account_number));
        scripted(&self.fail_recipient, || "RCP_test".to_string())
    }

    async fn initiate_transfer(&self, request: &TransferRequest) -> Result<TransferResult> {
        self.record(format!("transfer:{}:{}", request.recipient, request.amount));
        scripted(&self.fail_transfer, || TransferResult {
            transfer_code: "TRF_test".into(),
            status: Some(self.transfer_status.clone().unwrap_or_else(|| "pending".into())),
        })
    }

    async fn list_banks(&self) -> Result<Vec<Bank>> {
        self.record("banks".into());
        Ok(self.banks.clone())
    }
}
