//! Composition root: repositories, dispatcher and services.

use std::sync::Arc;

use domain::{
    EventDispatcher, Order, OrderService, Product, ProductService, User, UserService, handlers,
};
use metrics_exporter_prometheus::PrometheusHandle;
use store::InMemoryRepository;

use crate::config::Config;
use crate::error::AppError;
use crate::publisher::{ChannelPublisher, EventReceiver};
use crate::telemetry;

/// Everything a transport layer needs to serve requests.
///
/// There is exactly one dispatcher. Its handler set is fixed here and it is
/// shared by all three services.
pub struct AppContext {
    pub config: Config,
    pub users: Arc<UserService>,
    pub products: Arc<ProductService>,
    pub orders: Arc<OrderService>,
    pub dispatcher: Arc<EventDispatcher>,
    event_receiver: Option<EventReceiver>,
    metrics: Option<PrometheusHandle>,
}

impl AppContext {
    /// Builds the context over in-memory repositories.
    ///
    /// Registers the logging handlers and, if enabled, a channel publisher.
    /// Installs nothing global.
    pub fn build(config: Config) -> Self {
        let mut dispatcher = handlers::default_handlers()
            .into_iter()
            .fold(EventDispatcher::new(), EventDispatcher::register);

        let event_receiver = if config.event_publisher_enabled {
            let (publisher, receiver) = ChannelPublisher::channel(config.event_channel_capacity);
            dispatcher = dispatcher.with_publisher(Arc::new(publisher));
            Some(receiver)
        } else {
            None
        };
        let dispatcher = Arc::new(dispatcher);

        let user_repo = Arc::new(InMemoryRepository::<User>::new());
        let product_repo = Arc::new(InMemoryRepository::<Product>::new());
        let order_repo = Arc::new(InMemoryRepository::<Order>::new());

        let users = Arc::new(UserService::new(user_repo.clone(), dispatcher.clone()));
        let products = Arc::new(ProductService::new(product_repo.clone(), dispatcher.clone()));
        let orders = Arc::new(OrderService::new(
            order_repo,
            user_repo,
            product_repo,
            dispatcher.clone(),
        ));

        tracing::info!(
            handlers = dispatcher.handler_count(),
            publisher = dispatcher.has_publisher(),
            "application context built"
        );

        Self {
            config,
            users,
            products,
            orders,
            dispatcher,
            event_receiver,
            metrics: None,
        }
    }

    /// Reads configuration from the environment, installs tracing and (if
    /// enabled) the Prometheus recorder, then builds the context.
    pub fn bootstrap() -> Result<Self, AppError> {
        let config = Config::from_env()?;
        telemetry::init_tracing(&config)?;

        let metrics = if config.metrics_enabled {
            Some(telemetry::install_metrics_recorder()?)
        } else {
            None
        };

        Ok(Self::build(config).with_metrics_handle(metrics))
    }

    /// Attaches a Prometheus handle used by [`render_metrics`](Self::render_metrics).
    pub fn with_metrics_handle(mut self, handle: Option<PrometheusHandle>) -> Self {
        self.metrics = handle;
        self
    }

    /// Takes the receiver of published event batches. Returns `None` if the
    /// publisher is disabled or the receiver was already taken.
    ///
    /// Until someone drains it, writes beyond the channel capacity are still
    /// persisted but fail with a publisher `DispatchError`.
    pub fn take_event_receiver(&mut self) -> Option<EventReceiver> {
        self.event_receiver.take()
    }

    /// Renders the Prometheus exposition text, if metrics are enabled.
    pub fn render_metrics(&self) -> Option<String> {
        self.metrics.as_ref().map(PrometheusHandle::render)
    }
}
