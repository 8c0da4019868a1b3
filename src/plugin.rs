//! Plugin host for the storefront's iced application
//!
//! Plugins own a slice of application state (favorites, stored settings, ...)
//! and are driven by type-erased [`PluginMessage`]s routed through a
//! [`PluginManager`]. The application talks to a plugin through its typed
//! [`PluginHandle`].

use iced::futures::channel::mpsc;
use iced::{Subscription, Task};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::{Arc, Mutex};

/// Core trait that all plugins must implement.
/// Plugins own their state and respond to messages.
pub trait Plugin: Send + Sync {
    /// Public commands the application sends to this plugin
    type Input: Send + 'static;

    /// Every message the plugin handles, including its own task results
    type Message: From<Self::Input> + Clone + Send + Sync + 'static;

    /// The state type for this plugin
    type State: Send + 'static;

    /// Events emitted to application code listening on the handle
    type Output: Clone + Send + Sync + 'static;

    /// Returns the unique name/identifier for this plugin
    fn name(&self) -> &'static str;

    /// Build the initial state and a task to run once at startup
    fn init(&self) -> (Self::State, Task<Self::Message>);

    /// Update the plugin state based on a message.
    /// Returns follow-up work and an optional output for listeners.
    fn update(
        &self,
        state: &mut Self::State,
        message: Self::Message,
    ) -> (Task<Self::Message>, Option<Self::Output>);

    /// Subscribe to external events
    fn subscription(&self, _state: &Self::State) -> Subscription<Self::Message> {
        Subscription::none()
    }
}

/// Listeners per plugin index
type OutputRegistry = Arc<Mutex<HashMap<usize, Vec<mpsc::UnboundedSender<PluginOutput>>>>>;

/// Creates a stream that forwards outputs of one plugin
fn output_listener<O: Clone + Send + Sync + 'static>(
    plugin_index: usize,
    registry: OutputRegistry,
) -> impl iced::futures::Stream<Item = O> {
    use iced::futures::{SinkExt, StreamExt};

    iced::stream::channel(100, move |mut output_sender: mpsc::Sender<O>| async move {
        let (sender, mut receiver) = mpsc::unbounded();

        match registry.lock() {
            Ok(mut reg) => reg.entry(plugin_index).or_default().push(sender),
            Err(_) => {
                tracing::error!(plugin_index, "output registry poisoned, listener not attached");
                return;
            }
        }

        while let Some(output) = receiver.next().await {
            let Some(typed_output) = output.downcast::<O>() else {
                continue;
            };
            if output_sender.send(typed_output.clone()).await.is_err() {
                break;
            }
        }

        // The dropped sender is pruned on the next PluginManager::update
    })
}

/// A typed handle to an installed plugin
pub struct PluginHandle<P: Plugin> {
    plugin_index: usize,
    output_registry: OutputRegistry,
    _phantom: PhantomData<fn() -> P>,
}

impl<P: Plugin> Clone for PluginHandle<P> {
    fn clone(&self) -> Self {
        Self {
            plugin_index: self.plugin_index,
            output_registry: Arc::clone(&self.output_registry),
            _phantom: PhantomData,
        }
    }
}

impl<P: Plugin> std::fmt::Debug for PluginHandle<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginHandle")
            .field("plugin_index", &self.plugin_index)
            .finish()
    }
}

impl<P: Plugin> PluginHandle<P> {
    fn new(plugin_index: usize, output_registry: OutputRegistry) -> Self {
        Self {
            plugin_index,
            output_registry,
            _phantom: PhantomData,
        }
    }

    /// Create a task that delivers `input` to this plugin
    ///
    /// # Example
    /// ```ignore
    /// let task = favorites.dispatch(FavoritesInput::Remove(id)).map(Message::Plugin);
    /// ```
    pub fn dispatch(&self, input: P::Input) -> Task<PluginMessage> {
        Task::done(self.message(input))
    }

    /// Wrap `input` into a routable [`PluginMessage`]
    pub fn message(&self, input: P::Input) -> PluginMessage {
        PluginMessage::new(self.plugin_index, P::Message::from(input))
    }

    /// Subscribe to outputs from this plugin
    ///
    /// # Example
    /// ```ignore
    /// fn subscription(&self) -> Subscription<Message> {
    ///     Subscription::batch([
    ///         self.plugins.subscriptions().map(Message::Plugin),
    ///         self.favorites.listen().map(Message::Favorites),
    ///     ])
    /// }
    /// ```
    pub fn listen(&self) -> Subscription<P::Output> {
        struct ListenState<O> {
            plugin_index: usize,
            registry: OutputRegistry,
            _phantom: PhantomData<fn() -> O>,
        }

        impl<O> Clone for ListenState<O> {
            fn clone(&self) -> Self {
                Self {
                    plugin_index: self.plugin_index,
                    registry: Arc::clone(&self.registry),
                    _phantom: PhantomData,
                }
            }
        }

        impl<O> std::hash::Hash for ListenState<O> {
            fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
                self.plugin_index.hash(state);
                std::any::type_name::<O>().hash(state);
            }
        }

        fn create_stream<O: Clone + Send + Sync + 'static>(
            state: &ListenState<O>,
        ) -> iced::futures::stream::BoxStream<'static, O> {
            Box::pin(output_listener::<O>(
                state.plugin_index,
                Arc::clone(&state.registry),
            ))
        }

        let state = ListenState::<P::Output> {
            plugin_index: self.plugin_index,
            registry: Arc::clone(&self.output_registry),
            _phantom: PhantomData,
        };

        Subscription::run_with(state, create_stream::<P::Output>)
    }
}

/// A type-erased plugin message that can be routed automatically
#[derive(Clone, Debug)]
pub struct PluginMessage {
    plugin_index: usize,
    message: Arc<dyn Any + Send + Sync>,
    type_id: TypeId,
}

impl PluginMessage {
    fn new<M: 'static + Send + Sync>(plugin_index: usize, message: M) -> Self {
        Self {
            plugin_index,
            type_id: TypeId::of::<M>(),
            message: Arc::new(message),
        }
    }

    /// Index of the plugin this message is routed to
    pub fn plugin_index(&self) -> usize {
        self.plugin_index
    }
}

/// Type-erased output from a plugin
#[derive(Clone)]
pub struct PluginOutput {
    plugin_index: usize,
    output: Arc<dyn Any + Send + Sync>,
    type_id: TypeId,
}

impl PluginOutput {
    fn new<O: 'static + Send + Sync>(plugin_index: usize, output: O) -> Self {
        Self {
            plugin_index,
            type_id: TypeId::of::<O>(),
            output: Arc::new(output),
        }
    }

    /// Index of the plugin that emitted this output
    pub fn plugin_index(&self) -> usize {
        self.plugin_index
    }

    /// Try to downcast the output to a specific type
    pub fn downcast<O: 'static>(&self) -> Option<&O> {
        if self.type_id == TypeId::of::<O>() {
            self.output.downcast_ref::<O>()
        } else {
            None
        }
    }
}

impl std::fmt::Debug for PluginOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginOutput")
            .field("plugin_index", &self.plugin_index)
            .field("type_id", &self.type_id)
            .finish()
    }
}

type AnyMessage = Arc<dyn Any + Send + Sync>;
type UpdateFn =
    Box<dyn Fn(&mut dyn Any, AnyMessage) -> (Task<PluginMessage>, Option<PluginOutput>) + Send + Sync>;
type SubscriptionFn = Box<dyn Fn(&dyn Any) -> Subscription<PluginMessage> + Send + Sync>;

/// Holds a single plugin instance with its state and behavior
struct PluginEntry {
    name: &'static str,
    state: Box<dyn Any + Send>,
    state_type_id: TypeId,
    message_type_id: TypeId,
    update_fn: UpdateFn,
    subscription_fn: SubscriptionFn,
}

impl std::fmt::Debug for PluginEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginEntry")
            .field("name", &self.name)
            .field("state_type_id", &self.state_type_id)
            .field("message_type_id", &self.message_type_id)
            .finish_non_exhaustive()
    }
}

/// Holds all installed plugins and their states.
/// Embed it in the application state.
///
/// # Example
/// ```ignore
/// struct Shop {
///     plugins: PluginManager,
///     favorites: PluginHandle<FavoritesPlugin>,
/// }
/// ```
pub struct PluginManager {
    plugins: Vec<PluginEntry>,
    output_registry: OutputRegistry,
}

impl std::fmt::Debug for PluginManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginManager")
            .field("plugins", &self.plugins)
            .finish_non_exhaustive()
    }
}

impl Default for PluginManager {
    fn default() -> Self {
        Self::new()
    }
}

impl PluginManager {
    fn new() -> Self {
        Self {
            plugins: Vec::new(),
            output_registry: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Install a plugin, returning its handle and its init task
    fn install<P>(&mut self, plugin: P) -> (PluginHandle<P>, Task<PluginMessage>)
    where
        P: Plugin + 'static,
    {
        let name = plugin.name();
        let plugin = Arc::new(plugin);
        let (state, init_task) = plugin.init();
        let plugin_index = self.plugins.len();

        let plugin_for_update = Arc::clone(&plugin);
        let update_fn: UpdateFn = Box::new(move |state: &mut dyn Any, message: AnyMessage| {
            if let Some(msg) = message.downcast_ref::<P::Message>()
                && let Some(typed_state) = state.downcast_mut::<P::State>()
            {
                let (task, output) = plugin_for_update.update(typed_state, msg.clone());
                let task = task.map(move |plugin_msg| PluginMessage::new(plugin_index, plugin_msg));
                let plugin_output = output.map(|o| PluginOutput::new(plugin_index, o));
                (task, plugin_output)
            } else {
                (Task::none(), None)
            }
        });

        let plugin_for_subscription = Arc::clone(&plugin);
        let subscription_fn: SubscriptionFn = Box::new(move |state: &dyn Any| {
            match state.downcast_ref::<P::State>() {
                Some(typed_state) => plugin_for_subscription
                    .subscription(typed_state)
                    .with(plugin_index)
                    .map(|(plugin_index, msg)| PluginMessage::new(plugin_index, msg)),
                None => Subscription::none(),
            }
        });

        self.plugins.push(PluginEntry {
            name,
            state: Box::new(state),
            state_type_id: TypeId::of::<P::State>(),
            message_type_id: TypeId::of::<P::Message>(),
            update_fn,
            subscription_fn,
        });

        tracing::debug!(plugin = name, plugin_index, "installed plugin");

        let init_task = init_task.map(move |msg| PluginMessage::new(plugin_index, msg));
        let handle = PluginHandle::new(plugin_index, Arc::clone(&self.output_registry));
        (handle, init_task)
    }

    /// Route a plugin message to its plugin and fan the output out to listeners.
    ///
    /// # Example
    /// ```ignore
    /// match message {
    ///     Message::Plugin(plugin_msg) => self.plugins.update(plugin_msg).map(Message::Plugin),
    ///     // ... other messages
    /// }
    /// ```
    pub fn update(&mut self, message: PluginMessage) -> Task<PluginMessage> {
        let plugin_index = message.plugin_index;

        let Some(entry) = self.plugins.get_mut(plugin_index) else {
            tracing::warn!(plugin_index, "message for unknown plugin dropped");
            return Task::none();
        };

        if entry.message_type_id != message.type_id {
            tracing::warn!(plugin = entry.name, "message type mismatch, dropped");
            return Task::none();
        }

        let (task, output) = (entry.update_fn)(entry.state.as_mut(), message.message);

        if let Some(output) = output
            && let Ok(mut registry) = self.output_registry.lock()
            && let Some(senders) = registry.get_mut(&plugin_index)
        {
            // Drop listeners whose subscription has ended
            senders.retain(|sender| sender.unbounded_send(output.clone()).is_ok());
        }

        task
    }

    /// Collect all subscriptions from installed plugins
    pub fn subscriptions(&self) -> Subscription<PluginMessage> {
        Subscription::batch(
            self.plugins
                .iter()
                .map(|entry| (entry.subscription_fn)(entry.state.as_ref())),
        )
    }

    /// Get the number of installed plugins
    pub fn plugin_count(&self) -> usize {
        self.plugins.len()
    }

    /// Get a list of all installed plugin names in order
    pub fn plugin_names(&self) -> Vec<&'static str> {
        self.plugins.iter().map(|p| p.name).collect()
    }

    /// Borrow the state of the first plugin of type `P`
    pub fn get_plugin_state<P: Plugin>(&self) -> Option<&P::State> {
        self.plugins
            .iter()
            .find(|p| TypeId::of::<P::State>() == p.state_type_id)
            .and_then(|p| p.state.downcast_ref::<P::State>())
    }

    /// Mutably borrow the state of the first plugin of type `P`
    pub fn get_plugin_state_mut<P: Plugin>(&mut self) -> Option<&mut P::State> {
        self.plugins
            .iter_mut()
            .find(|p| TypeId::of::<P::State>() == p.state_type_id)
            .and_then(|p| p.state.downcast_mut::<P::State>())
    }
}

/// Installs plugins and collects their init tasks
///
/// The composition root must run the task returned by [`build`](Self::build);
/// that is where plugins hydrate persisted state.
///
/// # Example
/// ```ignore
/// let mut builder = PluginManagerBuilder::new();
/// let favorites = builder.install(FavoritesPlugin::new(storage));
/// let (plugins, init_task) = builder.build();
/// (Shop { plugins, favorites }, init_task.map(Message::Plugin))
/// ```
#[derive(Default)]
pub struct PluginManagerBuilder {
    manager: PluginManager,
    init_tasks: Vec<Task<PluginMessage>>,
}

impl PluginManagerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a plugin. Plugins are driven in the order they are installed.
    pub fn install<P>(&mut self, plugin: P) -> PluginHandle<P>
    where
        P: Plugin + 'static,
    {
        let (handle, init_task) = self.manager.install(plugin);
        self.init_tasks.push(init_task);
        handle
    }

    /// Finish installation, returning the manager and the batched init task
    pub fn build(self) -> (PluginManager, Task<PluginMessage>) {
        (self.manager, Task::batch(self.init_tasks))
    }
}
