// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

//! Continuous time ranges and their mapping onto discrete timesteps.

#[doc = "Time ranges, segment lookup and timestep index ranges."]
pub mod time_range;
