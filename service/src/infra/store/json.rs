//! JSON file [`Database`] implementation.
//!
//! The whole collection lives in a single JSON document. It's read
//! once on [`open()`], normalized into canonical [`Contract`]s, and
//! every mutating operation rewrites the file atomically (write to a
//! sibling temp file, then rename over the original), so a crash
//! mid-write never leaves a truncated document behind.
//!
//! [`open()`]: Json::open

use std::{
    collections::BTreeMap,
    io,
    path::PathBuf,
};

use common::operations::{By, Replace, Select, Snapshot, Update};
use derive_more::{Display, Error as StdError, From};
use serde::{Deserialize, Serialize};
use tokio::{fs, sync::RwLock};
use tracerr::Traced;

use crate::{
    domain::{
        contract::{self, legacy},
        payment, Contract,
    },
    infra::{store, Database},
    read,
};

/// JSON file [`Database`].
#[derive(Debug)]
pub struct Json {
    /// Path of the backing file.
    path: PathBuf,

    /// In-memory state, flushed back to the file on every write.
    state: RwLock<State>,
}

/// In-memory state of a [`Json`] store.
#[derive(Debug, Default)]
struct State {
    /// Normalized [`Contract`]s collection.
    contracts: Vec<Contract>,

    /// Payment ledger entries.
    payments: Vec<payment::Entry>,

    /// Backup snapshots, keyed by [`store::backup::Key`].
    ///
    /// Contracts are kept as raw [`legacy::Record`]s: backups preserve
    /// what was stored, not what it normalized to.
    backups: BTreeMap<String, Backup>,
}

/// Persisted shape of the whole [`Json`] store file.
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
struct Document {
    /// Stored [`Contract`] records.
    contracts: Vec<legacy::Record>,

    /// Payment ledger entries.
    payments: Vec<payment::Entry>,

    /// Backup snapshots.
    backups: BTreeMap<String, Backup>,
}

/// Single backup snapshot of the whole store: the stored [`Contract`]
/// records along with their payment ledger.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
struct Backup {
    /// Stored [`Contract`] records at the time of the snapshot.
    contracts: Vec<legacy::Record>,

    /// Payment ledger entries at the time of the snapshot.
    payments: Vec<payment::Entry>,
}

impl Json {
    /// Opens a [`Json`] store backed by the file at the provided path.
    ///
    /// A missing file is treated as an empty collection.
    ///
    /// # Errors
    ///
    /// If the file cannot be read or is not a valid JSON document.
    pub async fn open(
        path: impl Into<PathBuf>,
    ) -> Result<Self, Traced<store::Error>> {
        let path = path.into();
        let state = match fs::read(&path).await {
            Ok(bytes) => {
                let doc: Document = serde_json::from_slice(&bytes)
                    .map_err(tracerr::from_and_wrap!(=> Error))
                    .map_err(tracerr::map_from)?;
                State {
                    contracts: doc
                        .contracts
                        .into_iter()
                        .map(legacy::Record::normalize)
                        .collect(),
                    payments: doc.payments,
                    backups: doc.backups,
                }
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => State::default(),
            Err(e) => {
                return Err(e)
                    .map_err(tracerr::from_and_wrap!(=> Error))
                    .map_err(tracerr::map_from);
            }
        };
        Ok(Self {
            path,
            state: RwLock::new(state),
        })
    }

    /// Serializes the provided [`State`] and atomically rewrites the
    /// backing file with it.
    async fn flush(&self, state: &State) -> Result<(), Traced<store::Error>> {
        let doc = Document {
            contracts: state
                .contracts
                .iter()
                .map(legacy::Record::from)
                .collect(),
            payments: state.payments.clone(),
            backups: state.backups.clone(),
        };
        let bytes = serde_json::to_vec_pretty(&doc)
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, &bytes)
            .await
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)?;
        fs::rename(&tmp, &self.path)
            .await
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)
    }
}

/// JSON file store [`Error`].
///
/// [`Error`]: store::Error
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    /// Filesystem error.
    #[display("Filesystem error: {_0}")]
    Io(io::Error),

    /// JSON (de)serialization error.
    #[display("JSON codec error: {_0}")]
    Codec(serde_json::Error),
}

impl Database<Select<By<Option<Contract>, contract::Id>>> for Json {
    type Ok = Option<Contract>;
    type Err = Traced<store::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Contract>, contract::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self
            .state
            .read()
            .await
            .contracts
            .iter()
            .find(|c| c.id == id)
            .cloned())
    }
}

impl Database<Select<By<Vec<Contract>, read::contract::All>>> for Json {
    type Ok = Vec<Contract>;
    type Err = Traced<store::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<Contract>, read::contract::All>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self.state.read().await.contracts.clone())
    }
}

impl Database<Select<By<Vec<payment::Entry>, contract::Id>>> for Json {
    type Ok = Vec<payment::Entry>;
    type Err = Traced<store::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<payment::Entry>, contract::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self
            .state
            .read()
            .await
            .payments
            .iter()
            .filter(|e| e.contract_id == id)
            .copied()
            .collect())
    }
}

impl Database<Update<Contract>> for Json {
    type Ok = ();
    type Err = Traced<store::Error>;

    async fn execute(
        &self,
        Update(contract): Update<Contract>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut state = self.state.write().await;
        if let Some(slot) =
            state.contracts.iter_mut().find(|c| c.id == contract.id)
        {
            *slot = contract;
        } else {
            state.contracts.push(contract);
        }
        self.flush(&state).await
    }
}

impl Database<Replace<Vec<Contract>>> for Json {
    type Ok = ();
    type Err = Traced<store::Error>;

    async fn execute(
        &self,
        Replace(contracts): Replace<Vec<Contract>>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut state = self.state.write().await;
        state.contracts = contracts;
        self.flush(&state).await
    }
}

impl Database<Snapshot<store::backup::Key>> for Json {
    type Ok = ();
    type Err = Traced<store::Error>;

    async fn execute(
        &self,
        Snapshot(key): Snapshot<store::backup::Key>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut state = self.state.write().await;
        let backup = Backup {
            contracts: state
                .contracts
                .iter()
                .map(legacy::Record::from)
                .collect(),
            payments: state.payments.clone(),
        };
        drop(state.backups.insert(key.into(), backup));
        self.flush(&state).await
    }
}

#[cfg(test)]
mod spec {
    use std::{env, fs, path::PathBuf};

    use common::{Date, Handler as _};
    use uuid::Uuid;

    use crate::{
        command::{migrate_contracts, MigrateContracts, RecalculateContract},
        domain::contract::{self, FinancialStatus},
        query, read, Config, Service,
    };

    use super::{Document, Json};

    const ID_1: &str = "00000000-0000-0000-0000-000000000001";
    const ID_2: &str = "00000000-0000-0000-0000-000000000002";

    fn temp_path() -> PathBuf {
        env::temp_dir().join(format!("contracts-{}.json", Uuid::new_v4()))
    }

    fn date(s: &str) -> Date {
        Date::from_iso(s).unwrap()
    }

    fn id(s: &str) -> contract::Id {
        s.parse().unwrap()
    }

    async fn seeded(doc: &str) -> (Service<Json>, PathBuf) {
        let path = temp_path();
        fs::write(&path, doc).unwrap();
        let store = Json::open(&path).await.unwrap();
        (Service::new(Config::default(), store), path)
    }

    #[tokio::test]
    async fn opens_a_missing_file_as_an_empty_collection() {
        let store = Json::open(temp_path()).await.unwrap();
        let service = Service::new(Config::default(), store);

        let contracts = service
            .execute(query::contracts::List::by(read::contract::All))
            .await
            .unwrap();
        assert_eq!(contracts, vec![]);
    }

    #[tokio::test]
    async fn normalizes_historical_records_on_open() {
        let (service, _) = seeded(&format!(
            r#"{{"contracts": [{{
                "id": "{ID_1}",
                "numero": "VR-2019-0042",
                "dateDebut": "2025-01-10",
                "dateFin": "2025-01-14",
                "tarifJournalier": 300,
                "statut": "OPEN"
            }}]}}"#,
        ))
        .await;

        let contract = service
            .execute(query::contract::ById::by(id(ID_1)))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(contract.number.as_str(), "VR-2019-0042");
        assert_eq!(contract.daily_rate, "300EUR".parse().unwrap());
    }

    #[tokio::test]
    async fn recalculation_persists_through_a_reopen() {
        let (service, path) = seeded(&format!(
            r#"{{"contracts": [{{
                "id": "{ID_1}",
                "number": "VR-2025-0001",
                "startDate": "2025-01-10",
                "endDate": "2025-01-14",
                "dailyRate": 300,
                "totalAmount": 900,
                "lifecycle": "OPEN"
            }}]}}"#,
        ))
        .await;

        let recalculated = service
            .execute(RecalculateContract {
                contract_id: id(ID_1),
                as_of: date("2025-01-12"),
            })
            .await
            .unwrap();
        assert_eq!(recalculated.total_amount, "1200EUR".parse().unwrap());

        let reopened = Json::open(&path).await.unwrap();
        let stored = reopened
            .execute(common::operations::Select(
                common::operations::By::<Option<crate::domain::Contract>, _>::
                    new(id(ID_1)),
            ))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.total_amount, "1200EUR".parse().unwrap());
        assert!(stored.cache.and_then(|c| c.source_hash).is_some());
    }

    #[tokio::test]
    async fn migration_snapshots_tags_and_skips_dateless_records() {
        let (service, path) = seeded(&format!(
            r#"{{
                "contracts": [
                    {{
                        "id": "{ID_1}",
                        "number": "VR-2025-0001",
                        "startDate": "2025-01-10",
                        "endDate": "2025-01-14",
                        "dailyRate": 300,
                        "totalAmount": 900,
                        "lifecycle": "OPEN"
                    }},
                    {{"id": "{ID_2}", "number": "VR-2025-0002"}}
                ],
                "payments": [{{
                    "id": "00000000-0000-0000-0000-00000000000a",
                    "contractId": "{ID_1}",
                    "amount": "400EUR",
                    "method": "CASH",
                    "paidAt": "2025-01-11"
                }}]
            }}"#,
        ))
        .await;

        let report = service
            .execute(MigrateContracts {
                as_of: date("2025-01-12"),
            })
            .await
            .unwrap();
        assert_eq!(report.migrated, 1);
        assert_eq!(report.unchanged, 0);
        assert_eq!(report.skipped, 1);

        let doc: Document =
            serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
        assert_eq!(doc.backups.len(), 1);
        let backup = doc.backups.values().next().unwrap();
        assert_eq!(backup.contracts.len(), 2);
        assert_eq!(backup.payments.len(), 1);
        assert_eq!(backup.payments[0].amount, "400EUR".parse().unwrap());

        let reopened = Service::new(
            Config::default(),
            Json::open(&path).await.unwrap(),
        );
        let migrated = reopened
            .execute(query::contract::ById::by(id(ID_1)))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            migrated.migration.map(|m| m.version),
            Some(migrate_contracts::VERSION),
        );
        let skipped = reopened
            .execute(query::contract::ById::by(id(ID_2)))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(skipped.migration, None);
    }

    #[tokio::test]
    async fn classifies_a_closed_contract_against_its_ledger() {
        let (service, _) = seeded(&format!(
            r#"{{
                "contracts": [{{
                    "id": "{ID_1}",
                    "number": "VR-2025-0001",
                    "startDate": "2025-01-10",
                    "endDate": "2025-01-14",
                    "dailyRate": 300,
                    "advancePayment": 500,
                    "totalAmount": 1200,
                    "lifecycle": "CLOSED"
                }}],
                "payments": [{{
                    "id": "00000000-0000-0000-0000-00000000000a",
                    "contractId": "{ID_1}",
                    "amount": "400EUR",
                    "method": "BANK_TRANSFER",
                    "paidAt": "2025-01-13"
                }}]
            }}"#,
        ))
        .await;

        let status = service
            .execute(query::status::Classify {
                contract_id: id(ID_1),
                as_of: date("2025-02-01"),
            })
            .await
            .unwrap();
        assert_eq!(status, Some(FinancialStatus::InProgress));

        let payments = service
            .execute(query::payments::Summarize {
                contract_id: id(ID_1),
            })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(payments.remaining, "300EUR".parse().unwrap());
    }
}
