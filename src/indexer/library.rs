use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use crate::assets::AssetRegistry;
use crate::models::{ConversationRecord, ParseWarning, ParseWarnings, Provider};
use crate::parsers::ExportError;

/// Outcome of loading one provider's export.
#[derive(Debug)]
pub enum ProviderStatus {
    Loaded { source: PathBuf, conversations: usize, skipped: usize },
    Failed { source: PathBuf, error: ExportError },
}

impl ProviderStatus {
    pub fn source(&self) -> &Path {
        match self {
            Self::Loaded { source, .. } | Self::Failed { source, .. } => source,
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded { .. })
    }

    /// Operator-facing description of a failed load.
    pub fn failure_message(&self) -> Option<String> {
        match self {
            Self::Loaded { .. } => None,
            Self::Failed { error: ExportError::UnsupportedFormat { .. }, .. } => {
                Some("no conversations found / unsupported format".to_string())
            }
            Self::Failed { error, .. } => Some(error.to_string()),
        }
    }
}

/// Every loaded conversation, newest first, with per-provider assets,
/// warnings and load status.
///
/// Built once per load; a reload builds a new `Library`.
#[derive(Debug, Default)]
pub struct Library {
    conversations: Vec<ConversationRecord>,
    positions: HashMap<(Provider, String), usize>,
    assets: BTreeMap<Provider, AssetRegistry>,
    warnings: BTreeMap<Provider, ParseWarnings>,
    statuses: BTreeMap<Provider, ProviderStatus>,
}

impl Library {
    pub(crate) fn new(
        mut conversations: Vec<ConversationRecord>,
        assets: BTreeMap<Provider, AssetRegistry>,
        warnings: BTreeMap<Provider, ParseWarnings>,
        statuses: BTreeMap<Provider, ProviderStatus>,
    ) -> Self {
        conversations.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.provider.cmp(&b.provider))
                .then_with(|| a.external_id.cmp(&b.external_id))
        });

        let mut positions = HashMap::with_capacity(conversations.len());
        for (index, conversation) in conversations.iter().enumerate() {
            // First (newest) occurrence wins for repeated ids
            positions
                .entry((conversation.provider, conversation.external_id.clone()))
                .or_insert(index);
        }

        Self { conversations, positions, assets, warnings, statuses }
    }

    pub fn conversations(&self) -> &[ConversationRecord] {
        &self.conversations
    }

    pub fn len(&self) -> usize {
        self.conversations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }

    pub fn get(&self, provider: Provider, external_id: &str) -> Option<&ConversationRecord> {
        self.positions
            .get(&(provider, external_id.to_string()))
            .and_then(|&index| self.conversations.get(index))
    }

    pub fn by_provider(&self, provider: Provider) -> impl Iterator<Item = &ConversationRecord> {
        self.conversations.iter().filter(move |c| c.provider == provider)
    }

    pub fn assets(&self, provider: Provider) -> Option<&AssetRegistry> {
        self.assets.get(&provider)
    }

    /// All parse warnings, ChatGPT first.
    pub fn warnings(&self) -> impl Iterator<Item = &ParseWarning> {
        self.warnings.values().flat_map(ParseWarnings::iter)
    }

    pub fn provider_warnings(&self, provider: Provider) -> Option<&ParseWarnings> {
        self.warnings.get(&provider)
    }

    /// `None` when the provider has no configured export.
    pub fn status(&self, provider: Provider) -> Option<&ProviderStatus> {
        self.statuses.get(&provider)
    }

    pub fn statuses(&self) -> impl Iterator<Item = (Provider, &ProviderStatus)> {
        self.statuses.iter().map(|(provider, status)| (*provider, status))
    }

    pub fn failed_providers(&self) -> usize {
        self.statuses.values().filter(|status| !status.is_loaded()).count()
    }
}
