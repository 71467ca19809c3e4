use crate::application_impl::*;
use crate::application_port::*;
use crate::domain_port::*;
use crate::infra_memory::*;
use crate::infra_mysql::*;
use crate::logger::*;
use crate::settings::Settings;
use sqlx::{MySql, Pool};
use std::sync::Arc;

pub struct Server {
    pub user_service: Arc<dyn UserService>,
    pub relationship_service: Arc<dyn RelationshipService>,
    pool: Option<Pool<MySql>>,
}

impl Server {
    pub async fn try_new(settings: &Settings) -> anyhow::Result<Self> {
        let user_repo: Arc<dyn UserRepo>;
        let friendship_repo: Arc<dyn FriendshipRepo>;
        let tx_manager: Arc<dyn TxManager>;
        let pool: Option<Pool<MySql>>;

        match settings.store.backend.as_str() {
            "memory" => {
                let store = MemoryStore::shared();
                user_repo = Arc::new(MemoryUserRepo::new(store.clone()));
                friendship_repo = Arc::new(MemoryFriendshipRepo::new(store));
                tx_manager = Arc::new(MemoryTxManager::new());
                pool = None;
            }
            "mysql" => {
                let mysql_pool = Pool::<MySql>::connect(&settings.store.mysql_dsn).await?;
                user_repo = Arc::new(MySqlUserRepo::new(mysql_pool.clone()));
                friendship_repo = Arc::new(MySqlFriendshipRepo::new(mysql_pool.clone()));
                tx_manager = Arc::new(MySqlTxManager::new(mysql_pool.clone()));
                pool = Some(mysql_pool);
            }
            other => return Err(anyhow::anyhow!("Unknown store backend: {}", other)),
        }

        let user_service: Arc<dyn UserService> = Arc::new(RealUserService::new(
            user_repo.clone(),
            friendship_repo.clone(),
            tx_manager.clone(),
        ));
        let relationship_service: Arc<dyn RelationshipService> = Arc::new(
            RealRelationshipService::new(user_repo, friendship_repo, tx_manager),
        );

        info!("server started with {} store", settings.store.backend);

        Ok(Self {
            user_service,
            relationship_service,
            pool,
        })
    }

    pub async fn shutdown(&self) {
        info!("server shutting down...");

        if let Some(pool) = &self.pool {
            pool.close().await;
        }
    }
}
