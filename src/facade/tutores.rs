use tokio::sync::watch;
use tracing::warn;

use crate::api::ApiClient;
use crate::models::{Pet, Tutor, TutorUpsert};
use crate::notify::Notifier;

use super::{user_message, PAGE_SIZE};

/// Observable state behind the tutor list view.
#[derive(Debug, Clone, Default)]
pub struct TutorListState {
    pub items: Vec<Tutor>,
    pub total: u64,
    pub loading: bool,
    pub error: Option<String>,
    pub page: u32,
    pub search_term: String,
}

/// Facade over the tutor endpoints: pagination/search state, CRUD, and
/// pet linking. Clone is cheap; clones share the same channels.
#[derive(Clone)]
pub struct TutorFacade {
    api: ApiClient,
    notifier: Notifier,
    list_tx: watch::Sender<TutorListState>,
    selected_tx: watch::Sender<Option<Tutor>>,
    /// Pets linked to the selected tutor, for the detail view.
    tutor_pets_tx: watch::Sender<Vec<Pet>>,
}

impl TutorFacade {
    pub fn new(api: ApiClient, notifier: Notifier) -> Self {
        let (list_tx, _) = watch::channel(TutorListState::default());
        let (selected_tx, _) = watch::channel(None);
        let (tutor_pets_tx, _) = watch::channel(Vec::new());
        Self {
            api,
            notifier,
            list_tx,
            selected_tx,
            tutor_pets_tx,
        }
    }

    /// Current list state, synchronously.
    pub fn state(&self) -> TutorListState {
        self.list_tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<TutorListState> {
        self.list_tx.subscribe()
    }

    pub fn selected(&self) -> Option<Tutor> {
        self.selected_tx.borrow().clone()
    }

    pub fn subscribe_selected(&self) -> watch::Receiver<Option<Tutor>> {
        self.selected_tx.subscribe()
    }

    pub fn tutor_pets(&self) -> Vec<Pet> {
        self.tutor_pets_tx.borrow().clone()
    }

    pub fn subscribe_tutor_pets(&self) -> watch::Receiver<Vec<Pet>> {
        self.tutor_pets_tx.subscribe()
    }

    /// Load the current page with the current search term.
    pub async fn load(&self) {
        let (page, term) = {
            let state = self.list_tx.borrow();
            (state.page, state.search_term.clone())
        };
        self.list_tx.send_modify(|state| {
            state.loading = true;
            state.error = None;
        });

        let nome = (!term.is_empty()).then_some(term.as_str());
        match self.api.fetch_tutores(page, PAGE_SIZE, nome).await {
            Ok(response) => {
                let total = if response.total > 0 {
                    response.total
                } else {
                    response.content.len() as u64
                };
                self.list_tx.send_modify(|state| {
                    state.items = response.content;
                    state.total = total;
                    state.loading = false;
                });
            }
            Err(e) => {
                warn!(error = %e, "Failed to load tutors");
                let message = user_message(&e, "Erro ao carregar tutores.");
                self.list_tx.send_modify(|state| {
                    state.items = Vec::new();
                    state.loading = false;
                    state.error = Some(message);
                });
            }
        }
    }

    /// Search by name; resets pagination to the first page.
    pub async fn search(&self, nome: &str) {
        self.list_tx.send_modify(|state| {
            state.search_term = nome.trim().to_string();
            state.page = 0;
        });
        self.load().await;
    }

    pub async fn set_page(&self, page: u32) {
        self.list_tx.send_modify(|state| state.page = page);
        self.load().await;
    }

    /// Load a tutor and the pets linked to it.
    pub async fn load_by_id(&self, id: i64) {
        match self.api.fetch_tutor(id).await {
            Ok(tutor) => {
                self.selected_tx.send_replace(Some(tutor));
                self.load_tutor_pets(id).await;
            }
            Err(e) => {
                warn!(error = %e, tutor_id = id, "Failed to load tutor");
                self.notifier
                    .error(user_message(&e, "Erro ao carregar tutor."));
                self.selected_tx.send_replace(None);
                self.tutor_pets_tx.send_replace(Vec::new());
            }
        }
    }

    pub fn clear_selected(&self) {
        self.selected_tx.send_replace(None);
        self.tutor_pets_tx.send_replace(Vec::new());
    }

    async fn load_tutor_pets(&self, tutor_id: i64) {
        match self.api.fetch_tutor_pets(tutor_id).await {
            Ok(pets) => {
                self.tutor_pets_tx.send_replace(pets);
            }
            Err(e) => {
                warn!(error = %e, tutor_id, "Failed to load tutor pets");
                self.tutor_pets_tx.send_replace(Vec::new());
            }
        }
    }

    /// Create a tutor and reload the list. Returns the created record so
    /// the caller can navigate to it.
    pub async fn create(&self, body: TutorUpsert) -> Option<Tutor> {
        match self.api.create_tutor(&body).await {
            Ok(tutor) => {
                self.notifier.success("Tutor criado com sucesso.");
                self.load().await;
                Some(tutor)
            }
            Err(e) => {
                warn!(error = %e, "Failed to create tutor");
                self.notifier.error(user_message(&e, "Erro ao salvar tutor."));
                None
            }
        }
    }

    pub async fn update(&self, id: i64, body: TutorUpsert) -> Option<Tutor> {
        match self.api.update_tutor(id, &body).await {
            Ok(tutor) => {
                self.notifier.success("Tutor atualizado com sucesso.");
                self.selected_tx.send_replace(Some(tutor.clone()));
                self.load().await;
                Some(tutor)
            }
            Err(e) => {
                warn!(error = %e, tutor_id = id, "Failed to update tutor");
                self.notifier.error(user_message(&e, "Erro ao salvar tutor."));
                None
            }
        }
    }

    pub async fn delete(&self, id: i64) -> bool {
        match self.api.delete_tutor(id).await {
            Ok(()) => {
                self.notifier.success("Tutor removido com sucesso.");
                self.clear_selected();
                self.load().await;
                true
            }
            Err(e) => {
                warn!(error = %e, tutor_id = id, "Failed to delete tutor");
                self.notifier
                    .error(user_message(&e, "Erro ao remover tutor."));
                false
            }
        }
    }

    /// Link a pet to a tutor and refresh the linked-pets list.
    pub async fn link_pet(&self, tutor_id: i64, pet_id: i64) -> bool {
        match self.api.link_pet(tutor_id, pet_id).await {
            Ok(()) => {
                self.notifier.success("Pet vinculado com sucesso.");
                self.load_tutor_pets(tutor_id).await;
                true
            }
            Err(e) => {
                warn!(error = %e, tutor_id, pet_id, "Failed to link pet");
                self.notifier
                    .error(user_message(&e, "Erro ao vincular pet."));
                false
            }
        }
    }

    /// Unlink a pet from a tutor and refresh the linked-pets list.
    pub async fn unlink_pet(&self, tutor_id: i64, pet_id: i64) -> bool {
        match self.api.unlink_pet(tutor_id, pet_id).await {
            Ok(()) => {
                self.notifier.success("Pet desvinculado com sucesso.");
                self.load_tutor_pets(tutor_id).await;
                true
            }
            Err(e) => {
                warn!(error = %e, tutor_id, pet_id, "Failed to unlink pet");
                self.notifier
                    .error(user_message(&e, "Erro ao desvincular pet."));
                false
            }
        }
    }
}
