use super::tree::{ExpressionNode, FieldRef};
use crate::parser::Record;
use std::fmt;

/// Something unexpected found while evaluating a compiled tree.
///
/// A tree built against the same schema as the records never produces one;
/// they show up when a record is shorter than the schema says.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvalAnomaly {
    FieldOutOfRange {
        field: String,
        index: usize,
        record_len: usize,
    },
}

impl fmt::Display for EvalAnomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalAnomaly::FieldOutOfRange {
                field,
                index,
                record_len,
            } => write!(
                f,
                "field '{field}' (index {index}) is missing from a record of {record_len} fields"
            ),
        }
    }
}

/// Receives evaluation anomalies
pub trait AnomalySink {
    fn report(&mut self, anomaly: EvalAnomaly);
}

/// Sends anomalies to the `log` facade at warn level
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl AnomalySink for LogSink {
    fn report(&mut self, anomaly: EvalAnomaly) {
        log::warn!("evaluation anomaly: {anomaly}");
    }
}

impl AnomalySink for Vec<EvalAnomaly> {
    fn report(&mut self, anomaly: EvalAnomaly) {
        self.push(anomaly);
    }
}

/// Evaluate `node` against `record`, logging anomalies
pub fn evaluate(node: &ExpressionNode, record: &Record) -> bool {
    evaluate_with(node, record, &mut LogSink)
}

/// Evaluate `node` against `record`.
///
/// `&&` and `||` stop as soon as the left operand decides the result. A leaf
/// that cannot be evaluated is reported to `sink` and counts as `false`.
pub fn evaluate_with<S>(node: &ExpressionNode, record: &Record, sink: &mut S) -> bool
where
    S: AnomalySink + ?Sized,
{
    match node {
        ExpressionNode::And { left, right } => {
            evaluate_with(left, record, sink) && evaluate_with(right, record, sink)
        }
        ExpressionNode::Or { left, right } => {
            evaluate_with(left, record, sink) || evaluate_with(right, record, sink)
        }
        ExpressionNode::Not { operand } => !evaluate_with(operand, record, sink),
        ExpressionNode::ExactMatch { field, value } => {
            field_value(field, record, sink).is_some_and(|actual| actual == value.as_str())
        }
        ExpressionNode::RegexMatch { field, regex, .. } => {
            field_value(field, record, sink).is_some_and(|actual| regex.is_match(actual))
        }
    }
}

fn field_value<'r, S>(field: &FieldRef, record: &'r Record, sink: &mut S) -> Option<&'r str>
where
    S: AnomalySink + ?Sized,
{
    let value = record.field(field.index);
    if value.is_none() {
        sink.report(EvalAnomaly::FieldOutOfRange {
            field: field.name.clone(),
            index: field.index,
            record_len: record.len(),
        });
    }
    value
}

impl ExpressionNode {
    /// Whether `record` satisfies this expression
    pub fn matches(&self, record: &Record) -> bool {
        evaluate(self, record)
    }
}
