/*!
 * Monitoring
 * Tracing setup and structured reporting
 */

mod tracer;

pub use tracer::{init_tracing, report_stats};
