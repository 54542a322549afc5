//! Handler table: binds update patterns to handlers once at startup, then
//! dispatches every inbound update (and every scheduler tick) through it.

use crate::{
    errors::Error,
    handlers::{self, HandlerContext},
    messaging::types::IncomingUpdate,
    scheduler::RepeatingJob,
    Result,
};

/// What a route listens for. Patterns are exact; two routes may not share one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EventPattern {
    /// `/name`, compared case-insensitively.
    Command(String),
    MembersJoined,
    /// Ticks of the named scheduler job.
    Tick(String),
}

impl EventPattern {
    pub fn command(name: &str) -> Self {
        EventPattern::Command(name.trim_start_matches('/').to_lowercase())
    }

    pub fn tick(job: &RepeatingJob) -> Self {
        EventPattern::Tick(job.name.clone())
    }

    pub fn matches(&self, update: &IncomingUpdate) -> bool {
        match (self, update) {
            (EventPattern::Command(name), IncomingUpdate::Command(cmd)) => {
                cmd.name.eq_ignore_ascii_case(name)
            }
            (EventPattern::MembersJoined, IncomingUpdate::MembersJoined(_)) => true,
            (EventPattern::Tick(job), IncomingUpdate::Tick(tick)) => &tick.job == job,
            _ => false,
        }
    }
}

impl std::fmt::Display for EventPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventPattern::Command(name) => write!(f, "command:{name}"),
            EventPattern::MembersJoined => f.write_str("members-joined"),
            EventPattern::Tick(job) => write!(f, "tick:{job}"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Handler {
    Start,
    DeleteJoinNotice,
    BroadcastRules,
}

impl Handler {
    fn accepts(self, pattern: &EventPattern) -> bool {
        matches!(
            (self, pattern),
            (Handler::Start, EventPattern::Command(_))
                | (Handler::DeleteJoinNotice, EventPattern::MembersJoined)
                | (Handler::BroadcastRules, EventPattern::Tick(_))
        )
    }

    async fn run(self, ctx: &HandlerContext, update: &IncomingUpdate) -> Result<()> {
        match (self, update) {
            (Handler::Start, IncomingUpdate::Command(cmd)) => handlers::start(ctx, cmd).await,
            (Handler::DeleteJoinNotice, IncomingUpdate::MembersJoined(joined)) => {
                handlers::delete_join_notice(ctx, joined).await
            }
            (Handler::BroadcastRules, IncomingUpdate::Tick(_)) => {
                handlers::broadcast_rules(ctx).await
            }
            (handler, update) => Err(Error::Routing(format!(
                "{handler:?} cannot handle a {} update",
                update.kind()
            ))),
        }
    }
}

/// Outcome of a single dispatch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dispatch {
    Handled(Handler),
    /// No route matched; the update is dropped.
    Unrouted,
    /// The handler ran but its outbound call failed. Already logged.
    Failed(Handler),
}

#[derive(Default)]
pub struct RouterBuilder {
    routes: Vec<(EventPattern, Handler)>,
}

impl RouterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, pattern: EventPattern, handler: Handler) -> Result<Self> {
        if !handler.accepts(&pattern) {
            return Err(Error::Routing(format!(
                "{handler:?} cannot be bound to {pattern}"
            )));
        }
        if let Some((_, existing)) = self.routes.iter().find(|(p, _)| *p == pattern) {
            return Err(Error::Routing(format!(
                "{pattern} is already bound to {existing:?}"
            )));
        }
        self.routes.push((pattern, handler));
        Ok(self)
    }

    pub fn build(self, ctx: HandlerContext) -> Router {
        Router {
            ctx,
            routes: self.routes,
        }
    }
}

pub struct Router {
    ctx: HandlerContext,
    routes: Vec<(EventPattern, Handler)>,
}

impl Router {
    pub fn builder() -> RouterBuilder {
        RouterBuilder::new()
    }

    /// `/start`, join notices, and ticks of the configured rules job.
    pub fn standard(ctx: HandlerContext) -> Result<Self> {
        let rules = EventPattern::tick(&ctx.cfg.rules_schedule);
        Ok(Self::builder()
            .route(EventPattern::command("start"), Handler::Start)?
            .route(EventPattern::MembersJoined, Handler::DeleteJoinNotice)?
            .route(rules, Handler::BroadcastRules)?
            .build(ctx))
    }

    pub fn routes(&self) -> impl Iterator<Item = (&EventPattern, Handler)> {
        self.routes.iter().map(|(p, h)| (p, *h))
    }

    pub fn lookup(&self, update: &IncomingUpdate) -> Option<Handler> {
        self.routes
            .iter()
            .find(|(pattern, _)| pattern.matches(update))
            .map(|(_, handler)| *handler)
    }

    pub async fn dispatch(&self, update: &IncomingUpdate) -> Dispatch {
        let Some(handler) = self.lookup(update) else {
            tracing::trace!(kind = update.kind(), "no route");
            return Dispatch::Unrouted;
        };

        match handler.run(&self.ctx, update).await {
            Ok(()) => Dispatch::Handled(handler),
            Err(e) => {
                tracing::warn!(kind = update.kind(), ?handler, "handler failed: {e}");
                Dispatch::Failed(handler)
            }
        }
    }
}
