// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod aggregate;
pub mod alerts;
pub mod cli;
pub mod commands;
pub mod config;
pub mod currency;
pub mod db;
pub mod distribute;
pub mod error;
pub mod models;
pub mod poll;
pub mod utils;
