use serde::{Deserialize, Serialize};

use super::enums::Sex;

/// Demographics collected during the conversation.
///
/// Fields only ever move from `None` to `Some` or from one value to a newly
/// stated value; nothing clears them within a session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub age: Option<u16>,
    pub sex: Option<Sex>,
}

impl UserProfile {
    /// Overwrite with any newly provided value, keep the rest.
    pub fn merge(&mut self, age: Option<u16>, sex: Option<Sex>) {
        if age.is_some() {
            self.age = age;
        }
        if sex.is_some() {
            self.sex = sex;
        }
    }

    pub fn is_complete(&self) -> bool {
        self.age.is_some() && self.sex.is_some()
    }

    /// Human-readable names of the fields still missing, in asking order.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.age.is_none() {
            missing.push("age");
        }
        if self.sex.is_none() {
            missing.push("sex");
        }
        missing
    }
}
