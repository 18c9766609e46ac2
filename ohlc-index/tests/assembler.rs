mod helpers;

#[path = "assembler/scenarios.rs"]
mod scenarios;

#[path = "assembler/exclusion.rs"]
mod exclusion;
#[path = "assembler/registry.rs"]
mod registry;

#[path = "assembler/determinism.rs"]
mod determinism;
#[path = "assembler/quality.rs"]
mod quality;

#[path = "assembler/batch.rs"]
mod batch;
#[path = "assembler/resample.rs"]
mod resample;
