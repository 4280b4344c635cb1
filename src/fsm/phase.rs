//! Regime and step identities.
//!
//! A [`Phase`] is the closed pair (regime, step-within-regime).  Steps carry
//! the numeric codes the dashboard already understands, so the telemetry
//! channels keep their meaning across firmware generations.

/// Top-level mode of the sequencer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Regime {
    None = 0,
    Stop = 1,
    Start = 2,
    AcOk = 3,
    AcFail = 4,
}

impl Regime {
    pub const fn code(self) -> u8 {
        self as u8
    }

    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::None),
            1 => Some(Self::Stop),
            2 => Some(Self::Start),
            3 => Some(Self::AcOk),
            4 => Some(Self::AcFail),
            _ => None,
        }
    }
}

/// Steps of the shutdown choreography.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum StopStep {
    Begin = 101,
    PowerOff = 102,
    EngineOff = 104,
    End = 199,
}

/// Steps of the crank-and-pick-up-load choreography.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum StartStep {
    Begin = 1,
    EngineOn = 2,
    AirClose = 3,
    StarterOn = 4,
    StarterWait = 5,
    StarterStop = 6,
    AirOpen = 7,
    PowerOn = 8,
    WaitRestart = 11,
    End = 99,
}

/// Mains came back: cool down, then hand over to STOP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum AcOkStep {
    Begin = 201,
    GenOff = 202,
}

/// Mains went away: confirm the outage, then hand over to START.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum AcFailStep {
    Begin = 201,
    GenOn = 203,
}

/// Current position of the sequencer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Nothing has been requested since boot.
    Idle,
    Stop(StopStep),
    Start(StartStep),
    AcOk(AcOkStep),
    AcFail(AcFailStep),
}

impl Phase {
    pub const fn regime(self) -> Regime {
        match self {
            Self::Idle => Regime::None,
            Self::Stop(_) => Regime::Stop,
            Self::Start(_) => Regime::Start,
            Self::AcOk(_) => Regime::AcOk,
            Self::AcFail(_) => Regime::AcFail,
        }
    }

    pub const fn step_code(self) -> u16 {
        match self {
            Self::Idle => 0,
            Self::Stop(s) => s as u16,
            Self::Start(s) => s as u16,
            Self::AcOk(s) => s as u16,
            Self::AcFail(s) => s as u16,
        }
    }

    /// The BEGIN step of `regime`, or [`Phase::Idle`] for `Regime::None`.
    pub const fn begin(regime: Regime) -> Self {
        match regime {
            Regime::None => Self::Idle,
            Regime::Stop => Self::Stop(StopStep::Begin),
            Regime::Start => Self::Start(StartStep::Begin),
            Regime::AcOk => Self::AcOk(AcOkStep::Begin),
            Regime::AcFail => Self::AcFail(AcFailStep::Begin),
        }
    }

    /// Steps where the sequence rests until an external event moves it.
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Idle | Self::Stop(StopStep::End) | Self::Start(StartStep::End)
        )
    }

    /// Decode raw telemetry codes.  `None` for pairs outside every table.
    pub fn from_codes(regime: u8, step: u16) -> Option<Self> {
        let phase = match Regime::from_code(regime)? {
            Regime::None => match step {
                0 => Self::Idle,
                _ => return None,
            },
            Regime::Stop => Self::Stop(match step {
                101 => StopStep::Begin,
                102 => StopStep::PowerOff,
                104 => StopStep::EngineOff,
                199 => StopStep::End,
                _ => return None,
            }),
            Regime::Start => Self::Start(match step {
                1 => StartStep::Begin,
                2 => StartStep::EngineOn,
                3 => StartStep::AirClose,
                4 => StartStep::StarterOn,
                5 => StartStep::StarterWait,
                6 => StartStep::StarterStop,
                7 => StartStep::AirOpen,
                8 => StartStep::PowerOn,
                11 => StartStep::WaitRestart,
                99 => StartStep::End,
                _ => return None,
            }),
            Regime::AcOk => Self::AcOk(match step {
                201 => AcOkStep::Begin,
                202 => AcOkStep::GenOff,
                _ => return None,
            }),
            Regime::AcFail => Self::AcFail(match step {
                201 => AcFailStep::Begin,
                203 => AcFailStep::GenOn,
                _ => return None,
            }),
        };
        Some(phase)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Phase; 19] = [
        Phase::Idle,
        Phase::Stop(StopStep::Begin),
        Phase::Stop(StopStep::PowerOff),
        Phase::Stop(StopStep::EngineOff),
        Phase::Stop(StopStep::End),
        Phase::Start(StartStep::Begin),
        Phase::Start(StartStep::EngineOn),
        Phase::Start(StartStep::AirClose),
        Phase::Start(StartStep::StarterOn),
        Phase::Start(StartStep::StarterWait),
        Phase::Start(StartStep::StarterStop),
        Phase::Start(StartStep::AirOpen),
        Phase::Start(StartStep::PowerOn),
        Phase::Start(StartStep::WaitRestart),
        Phase::Start(StartStep::End),
        Phase::AcOk(AcOkStep::Begin),
        Phase::AcOk(AcOkStep::GenOff),
        Phase::AcFail(AcFailStep::Begin),
        Phase::AcFail(AcFailStep::GenOn),
    ];

    #[test]
    fn codes_decode_back_to_the_same_phase() {
        for phase in ALL {
            let decoded = Phase::from_codes(phase.regime().code(), phase.step_code());
            assert_eq!(decoded, Some(phase));
        }
    }

    #[test]
    fn step_from_another_regime_is_rejected() {
        // START/POWER_ON code under the STOP regime.
        assert_eq!(Phase::from_codes(Regime::Stop.code(), 8), None);
        // AC_OK's GEN_OFF is not part of AC_FAIL.
        assert_eq!(Phase::from_codes(Regime::AcFail.code(), 202), None);
        assert_eq!(Phase::from_codes(9, 1), None);
    }

    #[test]
    fn only_end_steps_and_idle_are_terminal() {
        let terminal: Vec<_> = ALL.iter().filter(|p| p.is_terminal()).collect();
        assert_eq!(terminal.len(), 3);
    }

    #[test]
    fn begin_matches_regime() {
        for regime in [Regime::Stop, Regime::Start, Regime::AcOk, Regime::AcFail] {
            assert_eq!(Phase::begin(regime).regime(), regime);
        }
        assert_eq!(Phase::begin(Regime::None), Phase::Idle);
    }
}
