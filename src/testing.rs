//! Testing utilities for parse report assertions
//!
//!     Parser tests should assert on the whole report, not just `found`: a grammar that
//!     succeeds for the wrong reason (an earlier alternative, a shorter match) still says
//!     `found: true`. The fluent API makes the full check cheap to write:
//!
//!     ```rust,ignore
//!     use universal_parser::testing::assert_report;
//!
//!     assert_report(&report)
//!         .found()
//!         .result_at("/name", &json!("p"))
//!         .cursor(3);
//!
//!     assert_report(&report)
//!         .failed_with(FailureKind::NoRuleMatching)
//!         .deepest(|failure| {
//!             failure
//!                 .kind(FailureKind::TokenNotMatching)
//!                 .hierarchy("tag.CLOSE_TAG");
//!         });
//!     ```

mod report_assertions;

pub use report_assertions::{assert_report, FailureAssertion, ReportAssertion};
