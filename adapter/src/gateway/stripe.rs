use std::time::Duration;

use async_trait::async_trait;
use kernel::gateway::checkout::{
    CheckoutGateway, CheckoutSession, CreateSession, PaymentIntent, SessionPaymentStatus,
    SessionState,
};
use serde::Deserialize;
use shared::{
    config::CheckoutConfig,
    error::{AppError, AppResult},
};

// Stripe Checkout API を REST で呼び出すゲートウェイ実装。
// 資格情報はプロセス起動時に一度だけ受け取り、以後は不変
pub struct StripeCheckoutGateway {
    client: reqwest::Client,
    secret_key: String,
    api_base: String,
}

impl StripeCheckoutGateway {
    pub fn new(config: &CheckoutConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .build()
            .map_err(transport_error)?;
        Ok(Self {
            client,
            secret_key: config.secret_key.clone(),
            api_base: config.api_base.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }
}

// タイムアウトを含む通信エラーはすべて GatewayError に写す
fn transport_error(e: reqwest::Error) -> AppError {
    AppError::GatewayError(e.to_string())
}

fn check_status(res: &reqwest::Response) -> AppResult<()> {
    if res.status().is_success() {
        Ok(())
    } else {
        Err(AppError::GatewayError(format!(
            "checkout provider returned {}",
            res.status()
        )))
    }
}

#[derive(Deserialize)]
struct CreatedSessionObject {
    id: String,
    url: String,
}

#[derive(Deserialize)]
struct RetrievedSessionObject {
    payment_status: PaymentStatusObject,
    payment_intent: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "snake_case")]
enum PaymentStatusObject {
    Paid,
    Unpaid,
    NoPaymentRequired,
}

impl From<PaymentStatusObject> for SessionPaymentStatus {
    fn from(value: PaymentStatusObject) -> Self {
        match value {
            PaymentStatusObject::Paid => SessionPaymentStatus::Paid,
            PaymentStatusObject::Unpaid => SessionPaymentStatus::Unpaid,
            PaymentStatusObject::NoPaymentRequired => SessionPaymentStatus::NoPaymentRequired,
        }
    }
}

#[derive(Deserialize)]
struct PaymentIntentObject {
    charges: ChargeList,
}

#[derive(Deserialize)]
struct ChargeList {
    data: Vec<ChargeObject>,
}

#[derive(Deserialize)]
struct ChargeObject {
    id: String,
}

#[async_trait]
impl CheckoutGateway for StripeCheckoutGateway {
    async fn create_session(&self, event: CreateSession) -> AppResult<CheckoutSession> {
        let params = [
            ("mode", "payment".to_string()),
            ("payment_method_types[0]", "card".to_string()),
            ("line_items[0][quantity]", "1".to_string()),
            ("line_items[0][price_data][currency]", event.currency),
            (
                "line_items[0][price_data][unit_amount]",
                event.amount_minor_units.to_string(),
            ),
            (
                "line_items[0][price_data][product_data][name]",
                event.product_name,
            ),
            ("success_url", event.success_url),
            ("cancel_url", event.cancel_url),
            ("customer_email", event.customer_email),
        ];
        let res = self
            .client
            .post(self.endpoint("/v1/checkout/sessions"))
            .bearer_auth(&self.secret_key)
            .form(&params)
            .send()
            .await
            .map_err(transport_error)?;
        check_status(&res)?;
        let session: CreatedSessionObject = res.json().await.map_err(transport_error)?;
        Ok(CheckoutSession {
            id: session.id,
            url: session.url,
        })
    }

    async fn retrieve_session(&self, session_id: &str) -> AppResult<SessionState> {
        let res = self
            .client
            .get(self.endpoint(&format!("/v1/checkout/sessions/{session_id}")))
            .bearer_auth(&self.secret_key)
            .send()
            .await
            .map_err(transport_error)?;
        check_status(&res)?;
        let session: RetrievedSessionObject = res.json().await.map_err(transport_error)?;
        Ok(SessionState {
            payment_status: session.payment_status.into(),
            payment_intent_id: session.payment_intent,
        })
    }

    async fn expire_session(&self, session_id: &str) -> AppResult<()> {
        let res = self
            .client
            .post(self.endpoint(&format!("/v1/checkout/sessions/{session_id}/expire")))
            .bearer_auth(&self.secret_key)
            .send()
            .await
            .map_err(transport_error)?;
        check_status(&res)
    }

    async fn retrieve_payment_intent(
        &self,
        payment_intent_id: &str,
    ) -> AppResult<PaymentIntent> {
        let res = self
            .client
            .get(self.endpoint(&format!("/v1/payment_intents/{payment_intent_id}")))
            .query(&[("expand[]", "charges")])
            .bearer_auth(&self.secret_key)
            .send()
            .await
            .map_err(transport_error)?;
        check_status(&res)?;
        let intent: PaymentIntentObject = res.json().await.map_err(transport_error)?;
        Ok(PaymentIntent {
            charge_ids: intent.charges.data.into_iter().map(|c| c.id).collect(),
        })
    }

    async fn create_refund(&self, charge_id: &str) -> AppResult<()> {
        let res = self
            .client
            .post(self.endpoint("/v1/refunds"))
            .bearer_auth(&self.secret_key)
            .form(&[("charge", charge_id)])
            .send()
            .await
            .map_err(transport_error)?;
        check_status(&res)
    }
}
