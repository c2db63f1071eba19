//! AWS rules.

pub mod rds;
pub mod s3;
pub mod sam;

use super::Rule;

#[must_use]
pub fn rules() -> Vec<Rule> {
    let mut rules = rds::rules();
    rules.extend(s3::rules());
    rules.extend(sam::rules());
    rules
}
