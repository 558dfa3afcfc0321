//! Gateway intents

use bitflags::bitflags;

bitflags! {
    /// Event groups the gateway should deliver
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct GatewayIntents: u64 {
        const GUILDS = 1 << 0;
        /// Privileged
        const GUILD_MEMBERS = 1 << 1;
        const GUILD_BANS = 1 << 2;
        const GUILD_EMOJIS = 1 << 3;
        const GUILD_INTEGRATIONS = 1 << 4;
        const GUILD_WEBHOOKS = 1 << 5;
        const GUILD_INVITES = 1 << 6;
        const GUILD_VOICE_STATES = 1 << 7;
        /// Privileged
        const GUILD_PRESENCES = 1 << 8;
        const GUILD_MESSAGES = 1 << 9;
        const GUILD_MESSAGE_REACTIONS = 1 << 10;
        const GUILD_MESSAGE_TYPING = 1 << 11;
        const DIRECT_MESSAGES = 1 << 12;
        const DIRECT_MESSAGE_REACTIONS = 1 << 13;
        const DIRECT_MESSAGE_TYPING = 1 << 14;
    }
}

impl GatewayIntents {
    /// Every unprivileged intent the dispatch table consumes
    #[must_use]
    pub const fn defaults() -> Self {
        Self::GUILDS
            .union(Self::GUILD_BANS)
            .union(Self::GUILD_EMOJIS)
            .union(Self::GUILD_INTEGRATIONS)
            .union(Self::GUILD_INVITES)
            .union(Self::GUILD_MESSAGES)
            .union(Self::GUILD_MESSAGE_REACTIONS)
            .union(Self::DIRECT_MESSAGES)
            .union(Self::DIRECT_MESSAGE_REACTIONS)
    }

    /// Intents that must be enabled for the application before use
    #[must_use]
    pub const fn privileged() -> Self {
        Self::GUILD_MEMBERS.union(Self::GUILD_PRESENCES)
    }
}

impl Default for GatewayIntents {
    fn default() -> Self {
        Self::defaults()
    }
}
