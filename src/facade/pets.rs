use tokio::sync::watch;
use tracing::warn;

use crate::api::ApiClient;
use crate::models::{Pet, PetUpsert};
use crate::notify::Notifier;

use super::{user_message, PAGE_SIZE};

/// Observable state behind the pet list view.
#[derive(Debug, Clone, Default)]
pub struct PetListState {
    pub items: Vec<Pet>,
    pub total: u64,
    pub loading: bool,
    pub error: Option<String>,
    pub page: u32,
    pub search_term: String,
}

/// Facade over the pet endpoints: pagination/search state, CRUD, and
/// photo upload. Clone is cheap; clones share the same channels.
#[derive(Clone)]
pub struct PetFacade {
    api: ApiClient,
    notifier: Notifier,
    list_tx: watch::Sender<PetListState>,
    selected_tx: watch::Sender<Option<Pet>>,
}

impl PetFacade {
    pub fn new(api: ApiClient, notifier: Notifier) -> Self {
        let (list_tx, _) = watch::channel(PetListState::default());
        let (selected_tx, _) = watch::channel(None);
        Self {
            api,
            notifier,
            list_tx,
            selected_tx,
        }
    }

    /// Current list state, synchronously.
    pub fn state(&self) -> PetListState {
        self.list_tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<PetListState> {
        self.list_tx.subscribe()
    }

    pub fn selected(&self) -> Option<Pet> {
        self.selected_tx.borrow().clone()
    }

    pub fn subscribe_selected(&self) -> watch::Receiver<Option<Pet>> {
        self.selected_tx.subscribe()
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
        match self.api.fetch_pets(page, PAGE_SIZE, nome).await {
            Ok(response) => {
                let (items, total) = response.into_page();
                self.list_tx.send_modify(|state| {
                    state.items = items;
                    state.total = total;
                    state.loading = false;
                });
            }
            Err(e) => {
                warn!(error = %e, "Failed to load pets");
                let message = user_message(&e, "Erro ao carregar pets.");
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

    pub async fn load_by_id(&self, id: i64) {
        match self.api.fetch_pet(id).await {
            Ok(pet) => self.selected_tx.send_replace(Some(pet)),
            Err(e) => {
                warn!(error = %e, pet_id = id, "Failed to load pet");
                self.notifier.error(user_message(&e, "Erro ao carregar pet."));
                self.selected_tx.send_replace(None)
            }
        };
    }

    pub fn clear_selected(&self) {
        self.selected_tx.send_replace(None);
    }

    /// Create a pet and reload the list. Returns the created record so the
    /// caller can navigate to it.
    pub async fn create(&self, body: PetUpsert) -> Option<Pet> {
        match self.api.create_pet(&body).await {
            Ok(pet) => {
                self.notifier.success("Pet criado com sucesso.");
                self.load().await;
                Some(pet)
            }
            Err(e) => {
                warn!(error = %e, "Failed to create pet");
                self.notifier.error(user_message(&e, "Erro ao salvar pet."));
                None
            }
        }
    }

    pub async fn update(&self, id: i64, body: PetUpsert) -> Option<Pet> {
        match self.api.update_pet(id, &body).await {
            Ok(pet) => {
                self.notifier.success("Pet atualizado com sucesso.");
                self.selected_tx.send_replace(Some(pet.clone()));
                self.load().await;
                Some(pet)
            }
            Err(e) => {
                warn!(error = %e, pet_id = id, "Failed to update pet");
                self.notifier.error(user_message(&e, "Erro ao salvar pet."));
                None
            }
        }
    }

    pub async fn delete(&self, id: i64) -> bool {
        match self.api.delete_pet(id).await {
            Ok(()) => {
                self.notifier.success("Pet removido com sucesso.");
                self.selected_tx.send_replace(None);
                self.load().await;
                true
            }
            Err(e) => {
                warn!(error = %e, pet_id = id, "Failed to delete pet");
                self.notifier.error(user_message(&e, "Erro ao remover pet."));
                false
            }
        }
    }

    /// Upload a photo for a pet and refresh the selected record so the new
    /// photo URL shows up.
    pub async fn upload_photo(
        &self,
        id: i64,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> bool {
        match self
            .api
            .upload_pet_photo(id, file_name, content_type, bytes)
            .await
        {
            Ok(()) => {
                self.notifier.success("Foto enviada com sucesso.");
                self.load_by_id(id).await;
                true
            }
            Err(e) => {
                warn!(error = %e, pet_id = id, "Failed to upload pet photo");
                self.notifier.error(user_message(&e, "Erro ao enviar foto."));
                false
            }
        }
    }
}
