pub mod paystack;

pub use paystack::{
    Bank, CheckoutSession, InitializePayment, PaymentGateway, PaystackClient, ResolvedAccount,
    TransferRecipient, TransferRequest, TransferResult,
};
