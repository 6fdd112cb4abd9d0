use super::test_helpers::*;
use super::*;
use crate::error::{Error, ParseError};
use crate::types::{Artist, QualityPreference, QualityTier, Song};
use std::sync::Arc;
