//! Robo-advisor dialog handler for the `recommendPortfolio` intent.
//!
//! Requests and responses follow the Lex dialog JSON contract: the bot
//! validates the `age`, `investmentAmount` and `riskLevel` slots, re-prompts
//! for the first invalid one (`ElicitSlot`), hands control back to the bot
//! when everything is valid (`Delegate`), and closes the conversation on
//! fulfillment (`Close`).
//!
//! A recognised `riskLevel` slot is answered by re-eliciting it with the
//! matching recommendation as the prompt. Numbers that do not parse and
//! unrecognised risk levels pass validation.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::CoinfolioError;

pub const RECOMMEND_PORTFOLIO: &str = "recommendPortfolio";
pub const MIN_INVESTMENT: f64 = 1000.0;

pub type Slots = BTreeMap<String, Option<String>>;
pub type SessionAttributes = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentRequest {
    pub current_intent: CurrentIntent,
    pub invocation_source: InvocationSource,
    #[serde(default)]
    pub session_attributes: Option<SessionAttributes>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentIntent {
    pub name: String,
    #[serde(default)]
    pub slots: Slots,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvocationSource {
    DialogCodeHook,
    FulfillmentCodeHook,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    #[serde(rename = "contentType")]
    pub content_type: String,
    pub content: String,
}

impl Message {
    pub fn plain(content: impl Into<String>) -> Self {
        Message {
            content_type: "PlainText".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FulfillmentState {
    Fulfilled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DialogAction {
    #[serde(rename_all = "camelCase")]
    ElicitSlot {
        intent_name: String,
        slots: Slots,
        slot_to_elicit: String,
        message: Message,
    },
    Delegate { slots: Slots },
    #[serde(rename_all = "camelCase")]
    Close {
        fulfillment_state: FulfillmentState,
        message: Message,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogResponse {
    pub session_attributes: Option<SessionAttributes>,
    pub dialog_action: DialogAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    FirstName,
    Age,
    InvestmentAmount,
    RiskLevel,
}

impl Slot {
    pub fn name(self) -> &'static str {
        match self {
            Slot::FirstName => "firstName",
            Slot::Age => "age",
            Slot::InvestmentAmount => "investmentAmount",
            Slot::RiskLevel => "riskLevel",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskLevel {
    None,
    Low,
    Medium,
    High,
}

impl FromStr for RiskLevel {
    type Err = String;

    /// Exact, case-sensitive match on the bot's slot values.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "None" => Ok(RiskLevel::None),
            "Low" => Ok(RiskLevel::Low),
            "Medium" => Ok(RiskLevel::Medium),
            "High" => Ok(RiskLevel::High),
            other => Err(format!("unknown risk level: {other}")),
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RiskLevel::None => "None",
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        };
        f.write_str(s)
    }
}

impl RiskLevel {
    /// Asset to hold, the (expected, trailing six months) cumulative return
    /// multipliers applied to the invested amount, and the lead-in of the
    /// trailing-return sentence.
    fn allocation(self) -> Option<(&'static str, f64, f64, &'static str)> {
        match self {
            RiskLevel::None => None,
            RiskLevel::Low => Some(("USD coin", 0.000004, 0.000002, "In the past 6 months,")),
            RiskLevel::Medium => Some(("Bitcoin", 41.452569, 44.217867, "In the past 6 months")),
            RiskLevel::High => Some((
                "Wrapped-Bitcoin",
                41.674941,
                44.199972,
                "In the past 6 months",
            )),
        }
    }

    /// Without an amount only the asset is named.
    pub fn recommendation(self, amount: Option<f64>) -> String {
        let Some((asset, expected, past, lead_in)) = self.allocation() else {
            return "Your portfolio should be 100% bonds (AGG), 0% equities (SPY)".to_string();
        };
        match amount {
            Some(amount) => format!(
                "You should invest in {asset}. You can expect cumulative return of ${}. \
                 {lead_in} you would have cumulatively made ${}.",
                dollar_amount(amount * expected),
                dollar_amount(amount * past),
            ),
            None => format!("You should invest in {asset}."),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Validation {
    Valid,
    Invalid { slot: Slot, message: String },
}

impl Validation {
    fn invalid(slot: Slot, message: impl Into<String>) -> Self {
        Validation::Invalid {
            slot,
            message: message.into(),
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Validation::Valid)
    }
}

/// Whole-dollar amount, rounded half to even and rendered as a float with a
/// trailing `.0` (`41453.0`, `1e+16`, `nan`).
pub fn dollar_amount(value: f64) -> String {
    let rounded = value.round_ties_even();
    if rounded.is_nan() {
        return "nan".to_string();
    }
    if rounded.is_infinite() {
        return if rounded > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if rounded.abs() < 1e16 {
        return format!("{rounded:.1}");
    }
    let sci = format!("{rounded:e}");
    match sci.split_once('e') {
        Some((mantissa, exp)) if exp.starts_with('-') => format!("{mantissa}e{exp}"),
        Some((mantissa, exp)) => format!("{mantissa}e+{exp}"),
        None => sci,
    }
}

/// Unparsable input reads as NaN, which passes every range check.
fn parse_number(value: &str) -> f64 {
    value.trim().parse::<f64>().unwrap_or(f64::NAN)
}

/// Check the slots in order and report the first violation.
pub fn validate_data(
    age: Option<&str>,
    investment_amount: Option<&str>,
    risk_level: Option<&str>,
) -> Validation {
    if let Some(age) = age {
        if parse_number(age) <= 0.0 {
            return Validation::invalid(
                Slot::Age,
                "You should be at least 0 years old to use this service, \
                 please provide a different age.",
            );
        }
    }

    let mut amount = None;
    if let Some(raw) = investment_amount {
        let value = parse_number(raw);
        if value < MIN_INVESTMENT {
            return Validation::invalid(
                Slot::InvestmentAmount,
                "The amount to convert should be greater or equal to 1000, \
                 please provide a correct amount.",
            );
        }
        amount = Some(value);
    }

    // Unrecognised levels are left for the bot to handle.
    if let Some(Ok(level)) = risk_level.map(str::parse::<RiskLevel>) {
        debug!(risk_level = %level, "answering with recommendation");
        return Validation::invalid(Slot::RiskLevel, level.recommendation(amount));
    }

    Validation::Valid
}

pub fn elicit_slot(
    session_attributes: Option<SessionAttributes>,
    intent_name: &str,
    slots: Slots,
    slot_to_elicit: Slot,
    message: Message,
) -> DialogResponse {
    DialogResponse {
        session_attributes,
        dialog_action: DialogAction::ElicitSlot {
            intent_name: intent_name.to_string(),
            slots,
            slot_to_elicit: slot_to_elicit.name().to_string(),
            message,
        },
    }
}

pub fn delegate(session_attributes: Option<SessionAttributes>, slots: Slots) -> DialogResponse {
    DialogResponse {
        session_attributes,
        dialog_action: DialogAction::Delegate { slots },
    }
}

pub fn close(
    session_attributes: Option<SessionAttributes>,
    fulfillment_state: FulfillmentState,
    message: Message,
) -> DialogResponse {
    DialogResponse {
        session_attributes,
        dialog_action: DialogAction::Close {
            fulfillment_state,
            message,
        },
    }
}

fn slot_value<'a>(slots: &'a Slots, slot: Slot) -> Option<&'a str> {
    slots.get(slot.name()).and_then(|v| v.as_deref())
}

pub fn recommend_portfolio(request: &IntentRequest) -> DialogResponse {
    let intent = &request.current_intent;
    let session = request.session_attributes.clone();

    if request.invocation_source == InvocationSource::FulfillmentCodeHook {
        return close(
            session,
            FulfillmentState::Fulfilled,
            Message::plain("Thank you for your information"),
        );
    }

    let validation = validate_data(
        slot_value(&intent.slots, Slot::Age),
        slot_value(&intent.slots, Slot::InvestmentAmount),
        slot_value(&intent.slots, Slot::RiskLevel),
    );

    match validation {
        Validation::Valid => delegate(session, intent.slots.clone()),
        Validation::Invalid { slot, message } => {
            debug!(slot = slot.name(), "eliciting slot");
            let mut slots = intent.slots.clone();
            slots.insert(slot.name().to_string(), None);
            elicit_slot(session, &intent.name, slots, slot, Message::plain(message))
        }
    }
}

pub fn dispatch(request: &IntentRequest) -> Result<DialogResponse, CoinfolioError> {
    let name = request.current_intent.name.as_str();
    debug!(intent = name, source = ?request.invocation_source, "dispatching intent");

    if name == RECOMMEND_PORTFOLIO {
        return Ok(recommend_portfolio(request));
    }

    Err(CoinfolioError::UnsupportedIntent(name.to_string()))
}

/// Parse a JSON request, dispatch it, and render the JSON response.
pub fn handle_json(input: &str) -> Result<String, CoinfolioError> {
    let request: IntentRequest =
        serde_json::from_str(input).map_err(|e| CoinfolioError::InvalidRequest {
            reason: e.to_string(),
        })?;
    let response = dispatch(&request)?;
    serde_json::to_string_pretty(&response).map_err(|e| CoinfolioError::InvalidRequest {
        reason: e.to_string(),
    })
}
