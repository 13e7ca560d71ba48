// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! HTTP handlers, one module per resource.

pub mod annotations;
pub mod feedback;
pub mod health;
pub mod members;
pub mod projects;
pub mod tags;
pub mod tasks;
