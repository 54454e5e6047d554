//! OP_RETURN data extraction.
//!
//! Scripts come straight off the chain. Anything that does not parse as
//! `OP_RETURN <pushes...>` yields `None`; nothing here can panic on input.

use bytes::Bytes;
use serde::Deserialize;

use inscribe_services::Candidate;

pub const OP_RETURN: u8 = 0x6a;
const OP_0: u8 = 0x00;
const OP_PUSHDATA1: u8 = 0x4c;
const OP_PUSHDATA2: u8 = 0x4d;
const OP_PUSHDATA4: u8 = 0x4e;
const OP_1NEGATE: u8 = 0x4f;
const OP_1: u8 = 0x51;
const OP_16: u8 = 0x60;

/// Build an `OP_RETURN <data>` script with the minimal push for `data`.
pub fn op_return_script(data: &[u8]) -> Vec<u8> {
    let mut script = Vec::with_capacity(data.len() + 6);
    script.push(OP_RETURN);
    match data.len() {
        0 => script.push(OP_0),
        n @ 1..=0x4b => script.push(n as u8),
        n @ 0x4c..=0xff => {
            script.push(OP_PUSHDATA1);
            script.push(n as u8);
        }
        n @ 0x100..=0xffff => {
            script.push(OP_PUSHDATA2);
            script.extend_from_slice(&(n as u16).to_le_bytes());
        }
        n => {
            script.push(OP_PUSHDATA4);
            script.extend_from_slice(&(n as u32).to_le_bytes());
        }
    }
    script.extend_from_slice(data);
    script
}

/// Data carried by an `OP_RETURN` script: all pushes concatenated.
///
/// A bare `OP_RETURN` yields empty data. Small-integer pushes (`OP_1NEGATE`,
/// `OP_1`..`OP_16`) contribute their one-byte value. Non-push opcodes or
/// truncated pushes yield `None`.
pub fn op_return_data(script: &[u8]) -> Option<Vec<u8>> {
    let (&first, mut rest) = script.split_first()?;
    if first != OP_RETURN {
        return None;
    }

    let mut data = Vec::new();
    while let Some((&op, tail)) = rest.split_first() {
        let (len, tail) = match op {
            OP_1NEGATE | OP_1..=OP_16 => {
                data.push(small_int(op));
                rest = tail;
                continue;
            }
            OP_0 => (0, tail),
            1..=0x4b => (op as usize, tail),
            OP_PUSHDATA1 => {
                let (&n, tail) = tail.split_first()?;
                (n as usize, tail)
            }
            OP_PUSHDATA2 => {
                let n = tail.get(..2)?;
                (u16::from_le_bytes([n[0], n[1]]) as usize, &tail[2..])
            }
            OP_PUSHDATA4 => {
                let n = tail.get(..4)?;
                (
                    u32::from_le_bytes([n[0], n[1], n[2], n[3]]) as usize,
                    &tail[4..],
                )
            }
            _ => return None,
        };
        data.extend_from_slice(tail.get(..len)?);
        rest = &tail[len..];
    }
    Some(data)
}

/// Byte pushed by a small-integer opcode, as its minimal script number.
fn small_int(op: u8) -> u8 {
    match op {
        OP_1NEGATE => 0x81,
        n => n - (OP_1 - 1),
    }
}

// ── Verbose transaction JSON ──────────────────────────────────────────────────

/// The parts of `getblock <hash> 2` transaction JSON the reader needs.
#[derive(Debug, Clone, Deserialize)]
pub struct RpcTransaction {
    pub txid: String,
    #[serde(default)]
    pub vout: Vec<RpcOutput>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RpcOutput {
    #[serde(rename = "scriptPubKey")]
    pub script_pub_key: ScriptPubKey,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScriptPubKey {
    #[serde(default)]
    pub hex: String,
}

/// Turn a transaction into a candidate: data of the first parseable
/// OP_RETURN output, or empty data if there is none.
pub fn candidate_from_tx(tx: &RpcTransaction) -> Candidate {
    let data = tx
        .vout
        .iter()
        .filter_map(|out| hex::decode(&out.script_pub_key.hex).ok())
        .find_map(|script| op_return_data(&script))
        .map(Bytes::from)
        .unwrap_or_default();
    Candidate {
        txid: tx.txid.clone(),
        data,
    }
}
