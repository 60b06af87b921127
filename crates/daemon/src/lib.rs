// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! §4.13/§4.14 (supplemented): the long-running daemon process that hosts
//! the Engine Root behind a Unix-domain-socket command protocol. Exposed as
//! a library so the CLI crate's integration tests and the binary entrypoint
//! share the same lifecycle/protocol/listener code.

pub mod lifecycle;
pub mod listener;
pub mod protocol;
