// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;

use tram_service::ServiceError;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("io error")]
    Io(#[from] std::io::Error),

    #[error("yaml parse error")]
    Yaml(#[from] serde_yaml::Error),

    #[error("service error")]
    Service(#[from] ServiceError),
}
