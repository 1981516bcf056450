// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

pub mod contribute;
pub mod crawler;
pub mod extractor;
pub mod index;
pub mod local_indexer;
pub mod logging;
pub mod notification;
pub mod pager;
pub mod refresher;
pub mod search;
pub mod sitemap;
