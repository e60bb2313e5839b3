use crate::hasher::FileIdentity;
use crate::registry::{FileRecord, Registry};

/// Where an incoming file should go, given what has been organized so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// No file of this name in the category yet.
    Fresh,
    /// Same name, size and hash as `original`; the incoming file is deleted.
    Duplicate { original: FileRecord },
    /// Same name, different size; placed next to the original under a `_N` name.
    Rename { original: FileRecord },
    /// Same name and size but different content; diverted to the archive subtree.
    Archive { original: FileRecord },
}

pub fn classify(
    registry: &Registry,
    category: &str,
    name: &str,
    identity: &FileIdentity,
) -> Decision {
    let Some(conflict) = registry.find(category, name) else {
        return Decision::Fresh;
    };

    if conflict.same_content(identity) {
        return Decision::Duplicate {
            original: conflict.clone(),
        };
    }
    if let Some(variant) = registry.find_variant(category, name, identity) {
        return Decision::Duplicate {
            original: variant.clone(),
        };
    }

    let original = conflict.clone();
    if conflict.size != identity.size {
        Decision::Rename { original }
    } else {
        Decision::Archive { original }
    }
}
