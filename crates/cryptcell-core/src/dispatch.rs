//! Multiplexing dispatch loop.
//!
//! One logical thread of control services every category: wait for ready
//! signals, fetch one message per ready category in fixed priority order,
//! route `(category, kind)` to the owning family, reply exactly once.
//! Handlers run to completion before the next message is fetched, which
//! is what makes the bare access table and clone pool safe.

use cryptcell_proto::{Category, CategoryMask, Message, MessageKind, Status};

use crate::context::ContextArena;
use crate::error::FatalError;
use crate::families::{
    aead, asymmetric, cipher, entropy, generator, hash, init, key_management, mac, rng,
};
use crate::primitives::CryptoPrimitives;
use crate::state::{ServiceConfig, ServiceState};
use crate::transport::Transport;

/// The crypto service: access control, per-connection contexts and the
/// primitive engine behind one dispatch loop.
pub struct CryptoService<P: CryptoPrimitives> {
    pub(crate) config: ServiceConfig,
    pub(crate) state: ServiceState,
    pub(crate) contexts: ContextArena<P>,
    pub(crate) primitives: P,
}

impl<P: CryptoPrimitives> CryptoService<P> {
    /// Service over `primitives` with the default configuration.
    pub fn new(primitives: P) -> Self {
        Self::with_config(primitives, ServiceConfig::default())
    }

    /// Service over `primitives` with an explicit configuration.
    pub fn with_config(primitives: P, config: ServiceConfig) -> Self {
        Self {
            state: ServiceState::new(&config),
            contexts: ContextArena::new(),
            primitives,
            config,
        }
    }

    /// Shared service state (access table, clone pool, init count).
    pub fn state(&self) -> &ServiceState {
        &self.state
    }

    /// The active configuration.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Drive the service forever.
    ///
    /// Returns only on a fatal framing violation; every recoverable
    /// failure has already been answered with a reply by then.
    pub fn run<T: Transport>(&mut self, transport: &mut T) -> Result<(), FatalError> {
        loop {
            self.run_once(transport, true)?;
        }
    }

    /// Service a single wait cycle: at most one message per ready
    /// category. Returns whether any message was processed.
    pub fn run_once<T: Transport>(
        &mut self,
        transport: &mut T,
        blocking: bool,
    ) -> Result<bool, FatalError> {
        let ready = transport.wait(CategoryMask::all(), blocking);
        if ready.is_empty() {
            return Ok(false);
        }

        let mut processed = false;
        for category in Category::PRIORITY {
            if !ready.contains(category) {
                continue;
            }
            let Some(message) = transport.fetch(category) else {
                continue;
            };
            processed = true;
            self.handle_message(transport, category, &message)?;
        }
        Ok(processed)
    }

    fn handle_message<T: Transport>(
        &mut self,
        transport: &mut T,
        category: Category,
        message: &Message,
    ) -> Result<(), FatalError> {
        let kind = MessageKind::from_raw(message.kind)
            .ok_or(FatalError::UnknownMessageKind { category, kind: message.kind })?;
        tracing::debug!(
            ?category,
            ?kind,
            connection = message.connection,
            partition = message.partition,
            "dispatching message"
        );

        let status = match (category, kind) {
            (Category::Init, MessageKind::Call) => init::on_init(self)?,
            (Category::Free, MessageKind::Call) => init::on_free(self)?,

            (Category::Mac, MessageKind::Connect) => mac::on_connect(self, message)?,
            (Category::Mac, MessageKind::Call) => mac::on_call(self, transport, message)?,
            (Category::Mac, MessageKind::Disconnect) => mac::on_disconnect(self, message)?,

            (Category::Hash, MessageKind::Connect) => hash::on_connect(self, message)?,
            (Category::Hash, MessageKind::Call) => hash::on_call(self, transport, message)?,
            (Category::Hash, MessageKind::Disconnect) => hash::on_disconnect(self, message)?,

            (Category::Cipher, MessageKind::Connect) => cipher::on_connect(self, message)?,
            (Category::Cipher, MessageKind::Call) => cipher::on_call(self, transport, message)?,
            (Category::Cipher, MessageKind::Disconnect) => cipher::on_disconnect(self, message)?,

            (Category::Generator, MessageKind::Connect) => generator::on_connect(self, message)?,
            (Category::Generator, MessageKind::Call) => {
                generator::on_call(self, transport, message)?
            },
            (Category::Generator, MessageKind::Disconnect) => {
                generator::on_disconnect(self, message)?
            },

            (Category::Asymmetric, MessageKind::Call) => {
                asymmetric::on_call(self, transport, message)?
            },
            (Category::Aead, MessageKind::Call) => aead::on_call(self, transport, message)?,
            (Category::KeyManagement, MessageKind::Call) => {
                key_management::on_call(self, transport, message)?
            },
            (Category::Rng, MessageKind::Call) => rng::on_call(self, transport, message)?,
            (Category::EntropyInject, MessageKind::Call) => {
                entropy::on_call(self, transport, message)?
            },

            // Stateless families accept connect/disconnect without work.
            _ => Status::Success,
        };

        transport.reply(message.connection, status);
        Ok(())
    }
}
