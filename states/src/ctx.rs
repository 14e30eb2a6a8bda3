use std::any::{Any, TypeId, type_name};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::{Command, CommandSnapshot, Compute, Dep, Graph, State, TopologyError};

type Update = (TypeId, Box<dyn Any + Send>);

/// Publishes values back into a [`StateCtx`] from commands and computes.
///
/// `set` is keyed by type: the next [`StateCtx::sync_computes`] replaces the
/// registered state or compute of the same type with the published value.
/// Cloneable and `Send`, so it can travel into spawned tasks.
#[derive(Clone)]
pub struct Updater {
    tx: flume::Sender<Update>,
}

impl Updater {
    /// Publish a replacement value for the registered state or compute `T`.
    pub fn set<T: Any + Send>(&self, value: T) {
        if self.tx.send((TypeId::of::<T>(), Box::new(value))).is_err() {
            log::debug!(
                "context dropped, discarding update for {}",
                type_name::<T>()
            );
        }
    }

    /// Publish a delta for the registered state or compute `T`. The target's
    /// `assign_box` folds the delta into the value held by the context at
    /// apply time, so concurrent publishers never overwrite each other the
    /// way whole-value `set`s from stale snapshots would.
    pub fn merge<T: Any, D: Any + Send>(&self, delta: D) {
        if self.tx.send((TypeId::of::<T>(), Box::new(delta))).is_err() {
            log::debug!(
                "context dropped, discarding delta for {}",
                type_name::<T>()
            );
        }
    }
}

/// Owns all states, computes and commands for one view-model.
///
/// The driving loop is: mutate states with [`StateCtx::update`], enqueue
/// commands, [`StateCtx::flush_commands`] to spawn them, then call
/// [`StateCtx::sync_computes`] to apply published updates and rerun dirty
/// computes in dependency order.
pub struct StateCtx {
    states: HashMap<TypeId, Box<dyn State>>,
    computes: HashMap<TypeId, Box<dyn Compute>>,
    commands: HashMap<TypeId, Arc<dyn Command>>,
    queue: Vec<TypeId>,
    graph: Graph,
    order: Vec<TypeId>,
    dirty: HashSet<TypeId>,
    updates_tx: flume::Sender<Update>,
    updates_rx: flume::Receiver<Update>,
    tasks: JoinSet<()>,
    cancel: CancellationToken,
}

impl Default for StateCtx {
    fn default() -> Self {
        Self::new()
    }
}

impl StateCtx {
    pub fn new() -> Self {
        let (updates_tx, updates_rx) = flume::unbounded();
        Self {
            states: HashMap::new(),
            computes: HashMap::new(),
            commands: HashMap::new(),
            queue: Vec::new(),
            graph: Graph::default(),
            order: Vec::new(),
            dirty: HashSet::new(),
            updates_tx,
            updates_rx,
            tasks: JoinSet::new(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn add_state<T: State>(&mut self, state: T) {
        self.graph.add_node(TypeId::of::<T>());
        self.states.insert(TypeId::of::<T>(), Box::new(state));
    }

    /// Register a compute and wire its dependencies into the graph. The
    /// compute is marked dirty so it runs on the first sync.
    pub fn record_compute<C: Compute>(&mut self, compute: C) -> Result<(), TopologyError> {
        let id = TypeId::of::<C>();
        let deps = compute.deps();
        self.graph.add_node(id);
        for state in deps.states {
            self.graph.route_to(state, id);
        }
        for upstream in deps.computes {
            self.graph.route_to(upstream, id);
        }
        self.computes.insert(id, Box::new(compute));
        self.dirty.insert(id);
        self.order = self.graph.topology_sort()?;
        Ok(())
    }

    pub fn record_command<C: Command>(&mut self, command: C) {
        self.commands.insert(TypeId::of::<C>(), Arc::new(command));
    }

    /// # Panics
    /// Panics if the state was never registered.
    pub fn state<T: State>(&self) -> &T {
        self.states
            .get(&TypeId::of::<T>())
            .and_then(|boxed| boxed.as_any().downcast_ref::<T>())
            .unwrap_or_else(|| panic!("state {} is not registered", type_name::<T>()))
    }

    /// # Panics
    /// Panics if the state was never registered.
    pub fn state_mut<T: State>(&mut self) -> &mut T {
        self.states
            .get_mut(&TypeId::of::<T>())
            .and_then(|boxed| boxed.as_any_mut().downcast_mut::<T>())
            .unwrap_or_else(|| panic!("state {} is not registered", type_name::<T>()))
    }

    /// Mutate a state in place and mark everything downstream of it dirty.
    pub fn update<T: State>(&mut self, mutate: impl FnOnce(&mut T)) {
        let id = TypeId::of::<T>();
        match self
            .states
            .get_mut(&id)
            .and_then(|boxed| boxed.as_any_mut().downcast_mut::<T>())
        {
            Some(state) => mutate(state),
            None => {
                log::warn!("update ignored, state {} is not registered", type_name::<T>());
                return;
            }
        }
        self.mark_dependents_dirty(id);
    }

    /// # Panics
    /// Panics if the compute was never registered.
    pub fn compute<T: Compute>(&self) -> &T {
        self.computes
            .get(&TypeId::of::<T>())
            .and_then(|boxed| boxed.as_any().downcast_ref::<T>())
            .unwrap_or_else(|| panic!("compute {} is not registered", type_name::<T>()))
    }

    pub fn updater(&self) -> Updater {
        Updater {
            tx: self.updates_tx.clone(),
        }
    }

    /// Queue a command for the next flush. A command already in the queue is
    /// skipped, so a double trigger dispatches once.
    pub fn enqueue_command<C: Command>(&mut self) {
        let id = TypeId::of::<C>();
        if !self.commands.contains_key(&id) {
            log::warn!(
                "enqueue ignored, command {} is not registered",
                type_name::<C>()
            );
            return;
        }
        if self.queue.contains(&id) {
            log::warn!("command {} is already queued, skipping", type_name::<C>());
            return;
        }
        self.queue.push(id);
    }

    /// Spawn every queued command with a snapshot taken now.
    pub fn flush_commands(&mut self) {
        let queue = std::mem::take(&mut self.queue);
        for id in queue {
            let Some(command) = self.commands.get(&id) else {
                continue;
            };
            let command = Arc::clone(command);
            let snap = self.take_snapshot();
            let updater = self.updater();
            let cancel = self.cancel.child_token();
            self.tasks.spawn(async move {
                command.run(snap, updater, cancel).await;
            });
        }
    }

    /// Apply published updates, then rerun dirty computes in topological
    /// order. Updates a running compute publishes are applied before its
    /// dependents run.
    pub fn sync_computes(&mut self) {
        self.apply_pending_updates();
        let order = self.order.clone();
        for id in order {
            if !self.dirty.remove(&id) {
                continue;
            }
            // Take the compute out of the map so Dep can borrow the rest.
            if let Some(boxed) = self.computes.remove(&id) {
                boxed.compute(Dep::new(&self.states, &self.computes), self.updater());
                self.computes.insert(id, boxed);
                self.apply_pending_updates();
            }
        }
    }

    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    pub fn task_set_mut(&mut self) -> &mut JoinSet<()> {
        &mut self.tasks
    }

    /// Cancel all in-flight commands and discard updates that never got
    /// applied. The context stays usable afterwards but nothing spawned
    /// before the call will land.
    pub async fn shutdown(&mut self) {
        self.cancel.cancel();
        self.tasks.shutdown().await;
        self.queue.clear();
        while self.updates_rx.try_recv().is_ok() {}
        self.cancel = CancellationToken::new();
    }

    fn mark_dependents_dirty(&mut self, id: TypeId) {
        for dependent in self.graph.dependents_of(id) {
            self.dirty.insert(dependent);
        }
    }

    fn apply_pending_updates(&mut self) {
        while let Ok((id, value)) = self.updates_rx.try_recv() {
            if let Some(compute) = self.computes.get_mut(&id) {
                compute.assign_box(value);
            } else if let Some(state) = self.states.get_mut(&id) {
                state.assign_box(value);
            } else {
                log::warn!("dropping update for unregistered type {id:?}");
                continue;
            }
            self.mark_dependents_dirty(id);
        }
    }

    fn take_snapshot(&self) -> CommandSnapshot {
        let mut states = BTreeMap::new();
        for (&id, state) in &self.states {
            if let Some(snap) = state.snapshot() {
                states.insert(id, snap);
            }
        }
        let mut computes = BTreeMap::new();
        for (&id, compute) in &self.computes {
            if let Some(snap) = compute.snapshot() {
                computes.insert(id, snap);
            }
        }
        CommandSnapshot::new(states, computes)
    }
}

#[cfg(test)]
mod tests {
    use std::any::{Any, TypeId};

    use tokio_util::sync::CancellationToken;

    use crate::{
        Command, CommandFuture, CommandSnapshot, Compute, ComputeDeps, Dep, State, Updater,
        assign_impl, state_assign_impl,
    };

    use super::StateCtx;

    #[derive(Clone, Default)]
    struct Counter {
        value: i64,
    }

    impl State for Counter {
        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }

        fn snapshot(&self) -> Option<Box<dyn Any + Send>> {
            Some(Box::new(self.clone()))
        }

        fn assign_box(&mut self, new_self: Box<dyn Any + Send>) {
            state_assign_impl(self, new_self);
        }
    }

    #[derive(Clone, Default)]
    struct Doubled {
        value: i64,
    }

    impl Compute for Doubled {
        fn as_any(&self) -> &dyn Any {
            self
        }

        fn deps(&self) -> ComputeDeps {
            ComputeDeps::on(vec![TypeId::of::<Counter>()], vec![])
        }

        fn compute(&self, deps: Dep<'_>, updater: Updater) {
            let counter = deps.state::<Counter>();
            updater.set(Doubled {
                value: counter.value * 2,
            });
        }

        fn assign_box(&mut self, new_self: Box<dyn Any + Send>) {
            assign_impl(self, new_self);
        }
    }

    #[derive(Clone, Default)]
    struct Quadrupled {
        value: i64,
    }

    impl Compute for Quadrupled {
        fn as_any(&self) -> &dyn Any {
            self
        }

        fn deps(&self) -> ComputeDeps {
            ComputeDeps::on(vec![], vec![TypeId::of::<Doubled>()])
        }

        fn compute(&self, deps: Dep<'_>, updater: Updater) {
            let doubled = deps.compute::<Doubled>();
            updater.set(Quadrupled {
                value: doubled.value * 2,
            });
        }

        fn assign_box(&mut self, new_self: Box<dyn Any + Send>) {
            assign_impl(self, new_self);
        }
    }

    #[derive(Clone, Default)]
    struct EventLog {
        entries: Vec<i64>,
    }

    struct Appended(i64);

    impl Compute for EventLog {
        fn as_any(&self) -> &dyn Any {
            self
        }

        fn deps(&self) -> ComputeDeps {
            ComputeDeps::none()
        }

        fn compute(&self, _deps: Dep<'_>, _updater: Updater) {}

        fn snapshot(&self) -> Option<Box<dyn Any + Send>> {
            Some(Box::new(self.clone()))
        }

        fn assign_box(&mut self, new_self: Box<dyn Any + Send>) {
            match new_self.downcast::<Appended>() {
                Ok(delta) => self.entries.push(delta.0),
                Err(other) => assign_impl(self, other),
            }
        }
    }

    struct IncrementCommand;

    impl Command for IncrementCommand {
        fn run(
            &self,
            snap: CommandSnapshot,
            updater: Updater,
            _cancel: CancellationToken,
        ) -> CommandFuture {
            let seen = snap.state::<Counter>().value;
            Box::pin(async move {
                updater.set(Counter { value: seen + 1 });
            })
        }
    }

    struct HangingCommand;

    impl Command for HangingCommand {
        fn run(
            &self,
            _snap: CommandSnapshot,
            updater: Updater,
            cancel: CancellationToken,
        ) -> CommandFuture {
            Box::pin(async move {
                tokio::select! {
                    _ = cancel.cancelled() => {}
                    _ = std::future::pending::<()>() => {
                        updater.set(Counter { value: 999 });
                    }
                }
            })
        }
    }

    fn ctx_with_counter() -> StateCtx {
        let mut ctx = StateCtx::new();
        ctx.add_state(Counter::default());
        ctx.record_compute(Doubled::default()).unwrap();
        ctx
    }

    async fn settle(ctx: &mut StateCtx) {
        ctx.sync_computes();
        ctx.flush_commands();
        while ctx.task_count() > 0 {
            let _ = ctx.task_set_mut().join_next().await;
            ctx.sync_computes();
        }
        ctx.sync_computes();
    }

    #[tokio::test]
    async fn update_reruns_dependent_computes() {
        let mut ctx = ctx_with_counter();
        ctx.sync_computes();
        assert_eq!(ctx.compute::<Doubled>().value, 0);

        ctx.update::<Counter>(|c| c.value = 21);
        ctx.sync_computes();
        assert_eq!(ctx.compute::<Doubled>().value, 42);
    }

    #[tokio::test]
    async fn computes_run_in_dependency_order() {
        let mut ctx = ctx_with_counter();
        ctx.record_compute(Quadrupled::default()).unwrap();

        ctx.update::<Counter>(|c| c.value = 3);
        ctx.sync_computes();
        assert_eq!(ctx.compute::<Doubled>().value, 6);
        assert_eq!(ctx.compute::<Quadrupled>().value, 12);
    }

    #[tokio::test]
    async fn command_updates_land_after_sync() {
        let mut ctx = ctx_with_counter();
        ctx.record_command(IncrementCommand);

        ctx.update::<Counter>(|c| c.value = 5);
        ctx.enqueue_command::<IncrementCommand>();
        settle(&mut ctx).await;

        assert_eq!(ctx.state::<Counter>().value, 6);
        assert_eq!(ctx.compute::<Doubled>().value, 12);
    }

    #[tokio::test]
    async fn duplicate_enqueue_dispatches_once() {
        let mut ctx = ctx_with_counter();
        ctx.record_command(IncrementCommand);

        ctx.enqueue_command::<IncrementCommand>();
        ctx.enqueue_command::<IncrementCommand>();
        settle(&mut ctx).await;

        assert_eq!(ctx.state::<Counter>().value, 1);
    }

    #[tokio::test]
    async fn merge_folds_deltas_into_the_current_value() {
        let mut ctx = StateCtx::new();
        ctx.record_compute(EventLog::default()).unwrap();

        // Two independent publishers; each delta lands on the value the
        // context holds when it is applied, so neither erases the other.
        let updater = ctx.updater();
        updater.merge::<EventLog, _>(Appended(1));
        ctx.updater().merge::<EventLog, _>(Appended(2));
        ctx.sync_computes();

        assert_eq!(ctx.compute::<EventLog>().entries, [1, 2]);
    }

    #[tokio::test]
    async fn shutdown_cancels_in_flight_commands() {
        let mut ctx = ctx_with_counter();
        ctx.record_command(HangingCommand);

        ctx.enqueue_command::<HangingCommand>();
        ctx.flush_commands();
        assert_eq!(ctx.task_count(), 1);

        ctx.shutdown().await;
        ctx.sync_computes();
        assert_eq!(ctx.task_count(), 0);
        assert_eq!(ctx.state::<Counter>().value, 0);
    }

    #[tokio::test]
    async fn shutdown_discards_unapplied_updates() {
        let mut ctx = ctx_with_counter();
        ctx.updater().set(Counter { value: 7 });
        ctx.shutdown().await;
        ctx.sync_computes();
        assert_eq!(ctx.state::<Counter>().value, 0);
    }
}
