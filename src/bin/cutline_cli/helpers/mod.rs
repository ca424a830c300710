// ABOUTME: Re-exports helper modules for cutline-cli
// ABOUTME: Report formatting and model override parsing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cutline Forecasting

pub mod display;
pub mod overrides;
