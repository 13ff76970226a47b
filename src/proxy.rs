//! The binary interchange form for a [`RuleBasedModel`] (§6): a one-byte
//! header carrying a type tag, the initial transition, then one fixed-width
//! record per rule. Modeled on the tagged block header in
//! `examples/boa-dev-temporal/zoneinfo/src/tzif.rs`'s `TzifBlockV2`, which
//! also leads with a tag byte before a run of fixed-width records.
//!
//! Deserialization always routes through [`decode`]; there is no public way
//! to construct a [`RuleBasedModel`] from raw bytes other than through this
//! module, so a caller cannot bypass the validation `RuleBasedModel::new`
//! already performs.

use crate::clock::SystemClock;
use crate::error::ProxyError;
use crate::model::RuleBasedModel;
use crate::rule::DaylightSavingRule;
use crate::transition::InitialTransition;

/// Top 5 bits of the header byte identify this as a rule-based model proxy.
const TYPE_TAG: u8 = 25;

fn header_byte() -> u8 {
    TYPE_TAG << 3
}

/// Encodes `model` into its binary proxy form.
pub fn encode(model: &RuleBasedModel) -> Vec<u8> {
    let mut out = Vec::new();
    out.push(header_byte());

    let initial = model.initial().as_transition();
    out.extend_from_slice(&initial.posix_time.to_be_bytes());
    out.extend_from_slice(&initial.previous_offset.to_be_bytes());
    out.extend_from_slice(&initial.total_offset.to_be_bytes());
    out.extend_from_slice(&initial.dst_savings.to_be_bytes());

    out.push(model.rules().len() as u8);
    for rule in model.rules() {
        rule.encode(&mut out);
    }
    out
}

/// Decodes a [`RuleBasedModel`] from its binary proxy form, reconstructing it
/// through [`RuleBasedModel::with_initial_transition`] so every construction
/// invariant is re-checked rather than assumed from the wire.
pub fn decode(bytes: &[u8]) -> Result<RuleBasedModel, ProxyError> {
    const HEADER_LEN: usize = 1 + 8 + 4 + 4 + 4 + 1;
    if bytes.len() < HEADER_LEN {
        return Err(ProxyError::MalformedStream);
    }

    let tag = bytes[0] >> 3;
    if tag != TYPE_TAG {
        return Err(ProxyError::UnsupportedIndicator(tag));
    }

    let mut offset = 1;
    let posix_time = i64::from_be_bytes(bytes[offset..offset + 8].try_into().unwrap());
    offset += 8;
    let previous_offset = i32::from_be_bytes(bytes[offset..offset + 4].try_into().unwrap());
    offset += 4;
    let total_offset = i32::from_be_bytes(bytes[offset..offset + 4].try_into().unwrap());
    offset += 4;
    let dst_savings = i32::from_be_bytes(bytes[offset..offset + 4].try_into().unwrap());
    offset += 4;

    if previous_offset != total_offset || dst_savings != 0 {
        return Err(ProxyError::MalformedStream);
    }

    let initial = if posix_time == i64::MIN {
        InitialTransition::RulesForever {
            standard_offset: total_offset,
        }
    } else {
        InitialTransition::StartingAt {
            posix_time,
            standard_offset: total_offset,
        }
    };

    let rule_count = bytes[offset];
    offset += 1;
    if !(2..128).contains(&rule_count) {
        return Err(ProxyError::InvalidRuleCount(rule_count));
    }

    let mut rules = Vec::with_capacity(rule_count as usize);
    for _ in 0..rule_count {
        let (rule, consumed) = DaylightSavingRule::decode(&bytes[offset..])?;
        offset += consumed;
        rules.push(rule);
    }

    RuleBasedModel::with_initial_transition(initial, rules, &SystemClock).map_err(ProxyError::from)
}
