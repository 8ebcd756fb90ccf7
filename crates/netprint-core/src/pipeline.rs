//! One extraction request end to end: assemble, evaluate, classify.

use crate::chunk::ChunkStore;
use crate::classify::{classify_footprint, ServiceTypeDb};
use crate::component::{build_service_footprint, ServiceFootprintDb};
use crate::conversion::ConversionRegistry;
use crate::definition::CompiledService;
use crate::footprint::{assemble, DeviceFailure, DeviceFootprintDb, Diagnostic};
use crate::{log_op_end, log_op_start};
use netprint_core_types::RunId;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Everything modeled for one service over one key list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedData {
    #[serde(rename = "ServiceName")]
    pub service_name: String,
    #[serde(rename = "Keys")]
    pub keys: Vec<String>,
    #[serde(rename = "ServiceComponents")]
    pub service_components: Vec<String>,
    #[serde(rename = "DeviceFootprintDB")]
    pub device_footprint_db: DeviceFootprintDb,
    #[serde(rename = "ServiceFootprintDB")]
    pub service_footprint_db: ServiceFootprintDb,
    #[serde(rename = "ServiceTypeDB")]
    pub service_type_db: ServiceTypeDb,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessReport {
    /// Recorded on the `process` span, so every log event of this request carries it
    pub run_id: RunId,
    pub processed: ProcessedData,
    #[serde(default)]
    pub failures: Vec<DeviceFailure>,
    #[serde(default)]
    pub diagnostics: Vec<Diagnostic>,
}

/// Model `service` over `keys` for every device in `store`.
///
/// A failed (device, key) extraction is listed in `failures` and its key is
/// absent from every artifact of that device.
pub fn process(
    service: &CompiledService,
    store: &ChunkStore,
    keys: &[String],
    registry: &ConversionRegistry,
) -> ProcessReport {
    let start = Instant::now();
    let run_id = RunId::new();
    let span = tracing::info_span!("process", run_id = %run_id);
    let _entered = span.enter();
    log_op_start!(
        "process",
        service = %service.name,
        device_count = store.devices().len(),
        key_count = keys.len()
    );

    let assembly = assemble(store, keys, &service.rules, registry);
    let service_footprint_db = build_service_footprint(&service.components, &assembly.footprint);
    let service_type_db = classify_footprint(&service_footprint_db, &service.catalog);

    let report = ProcessReport {
        run_id,
        processed: ProcessedData {
            service_name: service.name.clone(),
            keys: keys.to_vec(),
            service_components: service.component_names(),
            device_footprint_db: assembly.footprint,
            service_footprint_db,
            service_type_db,
        },
        failures: assembly.failures,
        diagnostics: assembly.diagnostics,
    };

    log_op_end!(
        "process",
        duration_ms = start.elapsed().as_millis() as u64,
        service = %service.name,
        failure_count = report.failures.len(),
        diagnostic_count = report.diagnostics.len()
    );
    report
}
