// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Tri-state fields for partial updates.
//!
//! With `#[serde(default, deserialize_with = "nullable::deserialize")]` an
//! absent key becomes `None`, an explicit `null` becomes `Some(None)` and a
//! value becomes `Some(Some(v))`.

use serde::{Deserialize, Deserializer};

pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
	D: Deserializer<'de>,
	T: Deserialize<'de>,
{
	Option::<T>::deserialize(deserializer).map(Some)
}
