//! # Conditions
//!
//! What the waiter looks for (`ConditionSpec`) and what it saw (`ObservedStatus`).

use crate::constants::{CONDITION_DENIED, CONDITION_INVALID_REQUEST, CONDITION_READY, REASON_FAILED};
use crate::crd::Condition;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Status of a condition, as written by the reconciler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ConditionStatus {
    True,
    False,
    Unknown,
}

impl ConditionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionStatus::True => "True",
            ConditionStatus::False => "False",
            ConditionStatus::Unknown => "Unknown",
        }
    }
}

impl FromStr for ConditionStatus {
    type Err = std::convert::Infallible;

    /// Anything the API server sends that is not `True` or `False` counts as `Unknown`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "True" => ConditionStatus::True,
            "False" => ConditionStatus::False,
            _ => ConditionStatus::Unknown,
        })
    }
}

impl fmt::Display for ConditionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A condition the waiter is looking for
///
/// `reason` narrows the match: cert-manager reports both the transient
/// `Ready=False/Pending` and the terminal `Ready=False/Failed`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConditionSpec {
    pub condition_type: String,
    pub desired_status: ConditionStatus,
    pub reason: Option<String>,
}

impl ConditionSpec {
    pub fn new(condition_type: impl Into<String>, desired_status: ConditionStatus) -> Self {
        Self {
            condition_type: condition_type.into(),
            desired_status,
            reason: None,
        }
    }

    /// Only match conditions carrying this reason
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// `Ready=True`
    pub fn ready() -> Self {
        Self::new(CONDITION_READY, ConditionStatus::True)
    }

    /// `Ready=False` with reason `Failed`
    pub fn failed() -> Self {
        Self::new(CONDITION_READY, ConditionStatus::False).with_reason(REASON_FAILED)
    }

    /// `Denied=True`
    pub fn denied() -> Self {
        Self::new(CONDITION_DENIED, ConditionStatus::True)
    }

    /// `InvalidRequest=True`
    pub fn invalid_request() -> Self {
        Self::new(CONDITION_INVALID_REQUEST, ConditionStatus::True)
    }

    pub fn matches(&self, condition: &ObservedCondition) -> bool {
        condition.condition_type == self.condition_type
            && condition.status == self.desired_status
            && self
                .reason
                .as_deref()
                .is_none_or(|reason| condition.reason.as_deref() == Some(reason))
    }
}

impl fmt::Display for ConditionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.condition_type, self.desired_status)?;
        if let Some(reason) = &self.reason {
            write!(f, ":{reason}")?;
        }
        Ok(())
    }
}

impl FromStr for ConditionSpec {
    type Err = String;

    /// Parses `Type`, `Type=Status` or `Type=Status:Reason`; status defaults to `True`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (type_and_status, reason) = match s.split_once(':') {
            Some((head, reason)) if !reason.is_empty() => (head, Some(reason)),
            Some(_) => return Err(format!("empty reason in condition '{s}'")),
            None => (s, None),
        };
        let (condition_type, status) = match type_and_status.split_once('=') {
            Some((t, status)) => (t, status),
            None => (type_and_status, "True"),
        };
        if condition_type.is_empty() {
            return Err(format!("empty condition type in '{s}'"));
        }
        let desired_status = match status {
            "True" | "true" => ConditionStatus::True,
            "False" | "false" => ConditionStatus::False,
            "Unknown" | "unknown" => ConditionStatus::Unknown,
            other => return Err(format!("invalid condition status '{other}' in '{s}'")),
        };
        let spec = ConditionSpec::new(condition_type, desired_status);
        Ok(match reason {
            Some(reason) => spec.with_reason(reason),
            None => spec,
        })
    }
}

/// One condition entry as read from the resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservedCondition {
    pub condition_type: String,
    pub status: ConditionStatus,
    pub reason: Option<String>,
    pub message: Option<String>,
    /// `metadata.resourceVersion` of the read that produced this entry
    pub observed_at_revision: Option<String>,
}

impl ObservedCondition {
    pub fn from_condition(condition: &Condition, revision: Option<&str>) -> Self {
        Self {
            condition_type: condition.r#type.clone(),
            status: condition
                .status
                .parse()
                .unwrap_or(ConditionStatus::Unknown),
            reason: condition.reason.clone(),
            message: condition.message.clone(),
            observed_at_revision: revision.map(str::to_string),
        }
    }
}

/// Conditions of a resource at one read, in the resource's own order
///
/// The default value means nothing has been observed yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ObservedStatus {
    pub conditions: Vec<ObservedCondition>,
}

impl ObservedStatus {
    pub fn new(conditions: Vec<ObservedCondition>) -> Self {
        Self { conditions }
    }

    /// Build a snapshot from raw CRD conditions
    pub fn from_conditions(conditions: &[Condition], revision: Option<&str>) -> Self {
        Self {
            conditions: conditions
                .iter()
                .map(|c| ObservedCondition::from_condition(c, revision))
                .collect(),
        }
    }

    /// First condition, in resource order, matching `spec`
    pub fn find(&self, spec: &ConditionSpec) -> Option<&ObservedCondition> {
        self.conditions.iter().find(|c| spec.matches(c))
    }

    /// Condition of the given type, whatever its status
    pub fn get(&self, condition_type: &str) -> Option<&ObservedCondition> {
        self.conditions
            .iter()
            .find(|c| c.condition_type == condition_type)
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// One-line summary for diagnostics, e.g. `Ready=False (Pending: waiting for approval)`
    pub fn summary(&self) -> String {
        if self.conditions.is_empty() {
            return "no conditions observed".to_string();
        }
        self.conditions
            .iter()
            .map(|c| {
                let mut line = format!("{}={}", c.condition_type, c.status);
                match (&c.reason, &c.message) {
                    (Some(reason), Some(message)) => {
                        line.push_str(&format!(" ({reason}: {message})"));
                    }
                    (Some(reason), None) => line.push_str(&format!(" ({reason})")),
                    (None, Some(message)) => line.push_str(&format!(" ({message})")),
                    (None, None) => {}
                }
                line
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}
