// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

mod error;
mod flat;
mod limits;
mod service;

pub use error::{SearchError, DEFAULT_STEP_LIMIT};
pub use flat::{find_path, Path};
pub use limits::{CancelToken, Limits};
pub use service::{LocalService, PathService, SearchRequest};
