// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Input handed to a task: a label plus string parameters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payload {
    pub job_type: String,
    pub params: HashMap<String, String>,
}

impl Payload {
    pub fn new(job_type: impl Into<String>, params: HashMap<String, String>) -> Self {
        Self {
            job_type: job_type.into(),
            params,
        }
    }

    /// Adds or replaces a single parameter
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }
}
