// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

//! Primitive records handed to an acceleration-structure builder, and the
//! instance producers that fill them.

#[doc = "Primitive references and their accumulated build info."]
pub mod primref;
#[doc = "Static, per-segment and time-range producers for instances."]
pub mod producers;
