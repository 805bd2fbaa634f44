// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipewright contributors

//! Built-in pipelines

use crate::component::{Component, ComponentRegistry, EntryPoint};
use crate::errors::PipewrightError;
use crate::pipeline::{Pipeline, PipelineBuilder};

/// Runtime image shared by the training pipeline components
pub const PYTORCH_RUNTIME_IMAGE: &str =
    "quay.io/modh/runtime-images:runtime-pytorch-ubi9-python-3.9-2023b-20231116";

/// The five-stage training pipeline: ingest → preprocess → train → convert → upload
pub fn model_training() -> Result<(ComponentRegistry, Pipeline), PipewrightError> {
    let stage = |name: &str, module: &str, function: &str| {
        Component::new(name, EntryPoint::new(module, function)).with_image(PYTORCH_RUNTIME_IMAGE)
    };

    let components = [
        stage("ingest-data", "data_ingestion", "ingest_data"),
        stage("preprocess-data", "preprocessing", "preprocess_data"),
        stage("train-model", "model_training", "train_model"),
        stage("convert-model", "model_conversion", "convert_model"),
        stage("upload-model", "model_upload", "upload_model").with_packages(["boto3", "botocore"]),
    ];

    let mut registry = ComponentRegistry::new();
    let mut builder = PipelineBuilder::new("model_training_pipeline_kfp")
        .description("Ingest, preprocess, train, convert and upload a model");

    let mut previous = None;
    for component in components {
        let task = builder.add_task(registry.register(component)?);
        if let Some(prev) = previous {
            builder.after(task, prev);
        }
        previous = Some(task);
    }

    Ok((registry, builder.build()))
}
