/// Feed ingestion clients.
///
/// Submodules:
/// - `datamart` — MSC Datamart hourly observation XML fetch and decode.

pub mod datamart;
