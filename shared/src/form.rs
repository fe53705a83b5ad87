//! Form text → [`AnalysisRequest`].
//!
//! Marshaling is pure: the same field text always produces the same request
//! or the same error, so the coordinator can run it before touching the
//! worker at all.

use crate::error::InputParseError;
use crate::protocol::{AnalysisRequest, GeneSets};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Raw text of every form field, exactly as typed.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct FormInput {
    pub genes: String,
    pub metric: String,
    pub gene_sets: String,
    pub weight: String,
    pub min_size: String,
    pub max_size: String,
    pub nperm: String,
    pub seed: String,
}

impl FormInput {
    pub fn marshal(&self) -> Result<AnalysisRequest, InputParseError> {
        let genes = parse_genes(&self.genes)?;
        let metric = parse_metric(&self.metric)?;
        if genes.len() != metric.len() {
            return Err(InputParseError::LengthMismatch {
                genes: genes.len(),
                metric: metric.len(),
            });
        }
        let gene_sets = parse_gene_sets(&self.gene_sets)?;
        let weight = parse_float("weight", &self.weight)?;
        let min_size: u32 = parse_integer("minSize", &self.min_size)?;
        let max_size: u32 = parse_integer("maxSize", &self.max_size)?;
        let nperm: u32 = parse_integer("nperm", &self.nperm)?;
        let seed: u64 = parse_integer("seed", &self.seed)?;

        if min_size < 1 {
            return Err(InputParseError::BelowMinimum {
                field: "minSize",
                minimum: 1,
                value: min_size.into(),
            });
        }
        if max_size < min_size {
            return Err(InputParseError::BelowMinimum {
                field: "maxSize",
                minimum: min_size.into(),
                value: max_size.into(),
            });
        }

        Ok(AnalysisRequest {
            genes,
            metric,
            gene_sets,
            weight,
            min_size,
            max_size,
            nperm,
            seed,
        })
    }
}

/// Splits a comma-separated list and trims each entry. A blank field is an
/// empty list; a blank entry inside a non-blank list is an error.
fn split_list<'a>(field: &'static str, raw: &'a str) -> Result<Vec<&'a str>, InputParseError> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    raw.split(',')
        .map(str::trim)
        .enumerate()
        .map(|(index, entry)| {
            if entry.is_empty() {
                Err(InputParseError::EmptyEntry {
                    field,
                    position: index + 1,
                })
            } else {
                Ok(entry)
            }
        })
        .collect()
}

pub fn parse_genes(raw: &str) -> Result<Vec<String>, InputParseError> {
    Ok(split_list("genes", raw)?
        .into_iter()
        .map(str::to_string)
        .collect())
}

pub fn parse_metric(raw: &str) -> Result<Vec<f64>, InputParseError> {
    split_list("metric", raw)?
        .into_iter()
        .map(|token| parse_float("metric", token))
        .collect()
}

pub fn parse_gene_sets(raw: &str) -> Result<GeneSets, InputParseError> {
    serde_json::from_str(raw).map_err(|error| InputParseError::GeneSets(error.to_string()))
}

fn parse_float(field: &'static str, raw: &str) -> Result<f64, InputParseError> {
    let token = raw.trim();
    match f64::from_str(token) {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(InputParseError::InvalidNumber {
            field,
            token: token.to_string(),
        }),
    }
}

fn parse_integer<T: FromStr>(field: &'static str, raw: &str) -> Result<T, InputParseError> {
    let token = raw.trim();
    token.parse().map_err(|_| InputParseError::InvalidInteger {
        field,
        token: token.to_string(),
    })
}
