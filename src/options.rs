//! Configuration for an extraction run.
//!
//! [`ReadabilityOptions`] holds the knobs of the extraction pipeline and
//! [`ReadabilityOptionsBuilder`] builds one fluently, falling back to the
//! defaults for anything left unset.
//!
//! ## Example
//!
//! ```rust
//! use readability_core::{Readability, ReadabilityOptions};
//!
//! let html = "<html><body><article><p>Content...</p></article></body></html>";
//!
//! // Defaults
//! let readability = Readability::new(html, None, None).unwrap();
//!
//! // Custom values
//! let options = ReadabilityOptions::builder()
//!     .char_threshold(300)
//!     .nb_top_candidates(10)
//!     .keep_classes(true)
//!     .build();
//!
//! let readability = Readability::new(html, None, Some(options)).unwrap();
//! ```

use crate::constants::{CLASS_TO_PRESERVE, DEFAULT_CHAR_THRESHOLD, DEFAULT_N_TOP_CANDIDATES};

/// Options controlling scoring limits, thresholds and output cleanup.
///
/// ```rust
/// use readability_core::ReadabilityOptions;
///
/// let options = ReadabilityOptions::builder()
///     .max_elems_to_parse(50_000)
///     .debug(true)
///     .build();
/// assert_eq!(options.char_threshold, 500);
/// ```
#[derive(Debug, Clone)]
pub struct ReadabilityOptions {
    /// Emit `tracing` debug events while extracting.
    ///
    /// Has no effect on the result. Events only show up if the caller has
    /// installed a subscriber.
    ///
    /// Default: `false`
    pub debug: bool,

    /// Reject documents with more elements than this.
    ///
    /// Checked once, before any processing. `0` disables the limit.
    ///
    /// Default: `0`
    pub max_elems_to_parse: usize,

    /// How many of the best-scoring candidates are kept while choosing the
    /// article root. `0` falls back to the default.
    ///
    /// Default: `5`
    pub nb_top_candidates: usize,

    /// Minimum plain-text length for an attempt to be accepted.
    ///
    /// Shorter results make the extractor relax its heuristics and retry.
    ///
    /// Default: `500`
    pub char_threshold: usize,

    /// Class names kept on article elements when classes are stripped.
    ///
    /// `"page"` is always kept, whether or not it is listed.
    ///
    /// Default: `vec!["page"]`
    pub classes_to_preserve: Vec<String>,

    /// Leave every `class` attribute in the output untouched.
    ///
    /// Default: `false`
    pub keep_classes: bool,
}

impl Default for ReadabilityOptions {
    fn default() -> Self {
        Self {
            debug: false,
            max_elems_to_parse: 0,
            nb_top_candidates: DEFAULT_N_TOP_CANDIDATES,
            char_threshold: DEFAULT_CHAR_THRESHOLD,
            classes_to_preserve: vec![CLASS_TO_PRESERVE.to_string()],
            keep_classes: false,
        }
    }
}

impl ReadabilityOptions {
    /// Creates a new builder for ReadabilityOptions
    pub fn builder() -> ReadabilityOptionsBuilder {
        ReadabilityOptionsBuilder::default()
    }

    /// Effective candidate limit.
    pub(crate) fn top_candidate_limit(&self) -> usize {
        if self.nb_top_candidates == 0 {
            DEFAULT_N_TOP_CANDIDATES
        } else {
            self.nb_top_candidates
        }
    }
}

/// Builder for [`ReadabilityOptions`].
///
/// ```rust
/// use readability_core::ReadabilityOptions;
///
/// let options = ReadabilityOptions::builder()
///     .classes_to_preserve(vec!["caption".to_string()])
///     .nb_top_candidates(3)
///     .build();
/// assert_eq!(options.nb_top_candidates, 3);
/// ```
#[derive(Debug, Default)]
pub struct ReadabilityOptionsBuilder {
    debug: Option<bool>,
    max_elems_to_parse: Option<usize>,
    nb_top_candidates: Option<usize>,
    char_threshold: Option<usize>,
    classes_to_preserve: Option<Vec<String>>,
    keep_classes: Option<bool>,
}

impl ReadabilityOptionsBuilder {
    /// Enable or disable debug logging
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = Some(debug);
        self
    }

    /// Set maximum number of elements to parse
    pub fn max_elems_to_parse(mut self, max: usize) -> Self {
        self.max_elems_to_parse = Some(max);
        self
    }

    /// Set number of top candidates to consider
    pub fn nb_top_candidates(mut self, nb: usize) -> Self {
        self.nb_top_candidates = Some(nb);
        self
    }

    /// Set character threshold
    pub fn char_threshold(mut self, threshold: usize) -> Self {
        self.char_threshold = Some(threshold);
        self
    }

    /// Set classes to preserve
    pub fn classes_to_preserve(mut self, classes: Vec<String>) -> Self {
        self.classes_to_preserve = Some(classes);
        self
    }

    /// Keep all CSS classes
    pub fn keep_classes(mut self, keep: bool) -> Self {
        self.keep_classes = Some(keep);
        self
    }

    /// Build the ReadabilityOptions
    pub fn build(self) -> ReadabilityOptions {
        let defaults = ReadabilityOptions::default();
        ReadabilityOptions {
            debug: self.debug.unwrap_or(defaults.debug),
            max_elems_to_parse: self
                .max_elems_to_parse
                .unwrap_or(defaults.max_elems_to_parse),
            nb_top_candidates: self.nb_top_candidates.unwrap_or(defaults.nb_top_candidates),
            char_threshold: self.char_threshold.unwrap_or(defaults.char_threshold),
            classes_to_preserve: self
                .classes_to_preserve
                .unwrap_or(defaults.classes_to_preserve),
            keep_classes: self.keep_classes.unwrap_or(defaults.keep_classes),
        }
    }
}
