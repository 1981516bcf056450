// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

pub mod commands;
pub mod document;
pub mod mode;
pub mod notification;
pub mod version;
