// SPDX-License-Identifier: MIT OR Apache-2.0
//! Ready-made node families built on the core framework.

pub mod automation;
pub mod erd;
