//! Cross-cutting application constants.

/// Number of sentences kept for narration.
pub const DEFAULT_MAXIMUM_SENTENCES: usize = 7;

/// Algorithmia endpoint of the Wikipedia parser algorithm.
pub const DEFAULT_WIKIPEDIA_ENDPOINT: &str =
    "https://api.algorithmia.com/v1/algo/web/WikipediaParser/0.1.2?timeout=300";

/// Watson Natural Language Understanding instance root.
pub const DEFAULT_KEYWORDS_SERVICE_URL: &str =
    "https://api.us-south.natural-language-understanding.watson.cloud.ibm.com";

/// Watson NLU API version date sent with every analyze call.
pub const DEFAULT_KEYWORDS_API_VERSION: &str = "2017-02-27";

/// File name of the persisted content record inside the data directory.
pub const STATE_FILE_NAME: &str = "content.json";
