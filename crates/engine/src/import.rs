//! Import-evidence filter.

use crate::audit::InspectedLib;
use crate::error::Result;
use crate::record::ContentRecord;
use crate::stage::{Emitter, Stage};
use log::debug;
use regex::{Regex, RegexBuilder};
use std::sync::Arc;

/// Case-insensitive pattern detecting references to `distribution`.
///
/// RxJava code imports `io.reactivex`, so that name is accepted as well.
pub fn import_regex(distribution: &str) -> Result<Regex> {
    let mut pattern = regex::escape(distribution);
    if distribution.eq_ignore_ascii_case("RxJava") {
        pattern.push_str("|reactivex");
    }
    Ok(RegexBuilder::new(&pattern).case_insensitive(true).build()?)
}

/// Drops records that never mention the distribution.
///
/// Runs after comment removal and before string removal: JavaScript-style
/// imports keep the module path inside a string literal.
pub struct ImportFilter {
    re: Regex,
    inspected: Option<Arc<[InspectedLib]>>,
    tallies: Vec<usize>,
}

impl ImportFilter {
    pub fn new(re: Regex) -> Self {
        Self {
            re,
            inspected: None,
            tallies: Vec::new(),
        }
    }

    /// Also tally passing files that import one of the inspected libraries.
    pub fn with_audit(mut self, inspected: Arc<[InspectedLib]>) -> Self {
        self.tallies = vec![0; inspected.len()];
        self.inspected = Some(inspected);
        self
    }

    pub fn tallies(&self) -> &[usize] {
        &self.tallies
    }

    pub fn matches(&self, text: &str) -> bool {
        self.re.is_match(text)
    }
}

impl Stage for ImportFilter {
    type Input = ContentRecord;
    type Output = ContentRecord;
    const NAME: &'static str = "check-import";

    fn process(&mut self, record: ContentRecord, out: &Emitter<ContentRecord>) -> Result<()> {
        if !self.matches(&record.content) {
            return Ok(());
        }
        if let Some(libs) = &self.inspected {
            for (lib, tally) in libs.iter().zip(self.tallies.iter_mut()) {
                if lib.pattern.is_match(&record.content) {
                    debug!("{} imports {}", record.inner_file, lib.name);
                    *tally += 1;
                }
            }
        }
        out.emit(record)
    }
}
