mod decoder;
mod dest;
mod extract;

pub use decoder::{encode_compact_index, CountFormat, Decoder, BLOCK_SIZE, MAX_NAME_LENGTH};
pub use dest::{DestinationResolver, DirResolver, ResolvedPath};
pub use extract::{
    extract, is_affirmative, DecisionPrompt, EntriesProcessed, EntryDecision, ExtractPolicy,
};
