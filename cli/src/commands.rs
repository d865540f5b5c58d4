/*
 * Copyright (c) Huawei Technologies Co., Ltd. 2025. All rights reserved.
 * Global Trust Authority is licensed under the Mulan PSL v2.
 * You can use this software according to the terms and conditions of the Mulan PSL v2.
 * You may obtain a copy of Mulan PSL v2 at:
 *     http://license.coscl.org.cn/MulanPSL2
 * THIS SOFTWARE IS PROVIDED ON AN "AS IS" BASIS, WITHOUT WARRANTIES OF ANY KIND, EITHER EXPRESS OR
 * IMPLIED, INCLUDING BUT NOT LIMITED TO NON-INFRINGEMENT, MERCHANTABILITY OR FIT FOR A PARTICULAR
 * PURPOSE.
 * See the Mulan PSL v2 for more details.
 */

use clap::Subcommand;
use std::path::PathBuf;

use crate::entities::{LogEncoding, OutputFormat};

#[derive(Subcommand)]
pub enum Command {
    /// Decode an event log and print every entry as JSON
    Parse {
        /// Event log file
        #[clap(short, long)]
        log: PathBuf,

        /// Encoding of the event log file
        #[clap(short, long, value_enum, default_value_t = LogEncoding::Binary)]
        encoding: LogEncoding,
    },

    /// Verify an event log against a reference integrity manifest
    Verify {
        /// Event log file
        #[clap(short, long)]
        log: PathBuf,

        /// Reference manifest file (JSON)
        #[clap(short, long)]
        rim: PathBuf,

        /// Encoding of the event log file
        #[clap(short, long, value_enum, default_value_t = LogEncoding::Binary)]
        encoding: LogEncoding,

        /// Report format
        #[clap(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Number of verification threads, overrides the configuration file
        #[clap(short, long)]
        workers: Option<usize>,

        /// Also recompute digests defined over the event data itself
        #[clap(long)]
        check_event_digests: bool,
    },
}
