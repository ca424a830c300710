// ABOUTME: Re-exports command modules for cutline-cli
// ABOUTME: Forecast, profile maintenance, current-event and configuration commands
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cutline Forecasting

pub mod config;
pub mod current;
pub mod forecast;
pub mod profile;
