//! Transaction builder and broadcaster backed by the node's wallet.
//!
//! create (data output + value output) → fund → sign → decode for txid.
//! The node owns keys, coin selection and fees.

use anyhow::Context;
use serde::Deserialize;
use serde_json::{json, Value};

use inscribe_core::config::{AppConfig, ClientConfig};
use inscribe_services::{Ack, Broadcaster, TransactionBuilder, TransactionHandle};

use crate::rpc::RpcClient;

#[derive(Deserialize)]
struct Funded {
    hex: String,
}

#[derive(Deserialize)]
struct Signed {
    hex: String,
    complete: bool,
}

#[derive(Deserialize)]
struct Decoded {
    txid: String,
}

/// Format satoshis as a BTC decimal string. Strings avoid float rounding.
pub fn sat_to_btc(sat: u64) -> String {
    format!("{}.{:08}", sat / 100_000_000, sat % 100_000_000)
}

#[derive(Clone)]
pub struct RpcTransactionBuilder {
    rpc: RpcClient,
    /// Receives the amount. None = a fresh wallet change address.
    pay_to: Option<String>,
    fee_rate: Option<f64>,
}

impl RpcTransactionBuilder {
    pub fn new(rpc: RpcClient, pay_to: Option<String>, fee_rate: Option<f64>) -> Self {
        Self {
            rpc,
            pay_to,
            fee_rate,
        }
    }

    pub fn from_config(rpc: RpcClient, app: &AppConfig, client: &ClientConfig) -> Self {
        Self::new(rpc, app.pay_to.clone(), client.fee_rate)
    }

    async fn destination(&self) -> anyhow::Result<String> {
        match &self.pay_to {
            Some(addr) => Ok(addr.clone()),
            None => self
                .rpc
                .wallet_call("getrawchangeaddress", json!([]))
                .await
                .context("failed to get a wallet address for the amount"),
        }
    }

    fn outputs(frame: &[u8], destination: &str, amount: u64) -> Value {
        let mut outputs = vec![json!({ "data": hex::encode(frame) })];
        if amount > 0 {
            let mut value_output = serde_json::Map::new();
            value_output.insert(destination.to_string(), json!(sat_to_btc(amount)));
            outputs.push(Value::Object(value_output));
        }
        Value::Array(outputs)
    }
}

impl TransactionBuilder for RpcTransactionBuilder {
    async fn build(&self, amount: u64, frame: &[u8]) -> anyhow::Result<TransactionHandle> {
        let destination = self.destination().await?;
        let outputs = Self::outputs(frame, &destination, amount);

        let raw: String = self
            .rpc
            .call("createrawtransaction", json!([[], outputs]))
            .await
            .context("createrawtransaction")?;

        let mut fund_options = json!({});
        if let Some(rate) = self.fee_rate {
            fund_options["fee_rate"] = json!(rate);
        }
        let funded: Funded = self
            .rpc
            .wallet_call("fundrawtransaction", json!([raw, fund_options]))
            .await
            .context("fundrawtransaction")?;

        let signed: Signed = self
            .rpc
            .wallet_call("signrawtransactionwithwallet", json!([funded.hex]))
            .await
            .context("signrawtransactionwithwallet")?;
        if !signed.complete {
            anyhow::bail!("wallet could not sign every input");
        }

        let decoded: Decoded = self
            .rpc
            .call("decoderawtransaction", json!([signed.hex]))
            .await
            .context("decoderawtransaction")?;

        tracing::debug!(txid = %decoded.txid, bytes = signed.hex.len() / 2, "signed transaction ready");
        Ok(TransactionHandle {
            txid: decoded.txid,
            hex: signed.hex,
        })
    }
}

impl Broadcaster for RpcTransactionBuilder {
    async fn broadcast(&self, tx_hex: &str) -> anyhow::Result<Ack> {
        let txid: String = self
            .rpc
            .call("sendrawtransaction", json!([tx_hex]))
            .await
            .context("sendrawtransaction")?;
        Ok(Ack { txid })
    }
}
