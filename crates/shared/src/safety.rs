//! Static safety content shown alongside the simulations.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerificationCard {
    pub title: &'static str,
    pub subtitle: &'static str,
    pub items: [&'static str; 4],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmergencyNumber {
    pub label: &'static str,
    pub number: &'static str,
}

pub const VERIFICATION_CARDS: [VerificationCard; 3] = [
    VerificationCard {
        title: "Police Rights",
        subtitle: "Know your rights against fake police",
        items: [
            "Real police NEVER arrest over video call",
            "Real police NEVER ask for money online",
            "Real police NEVER ask for your bank OTP",
            "If in doubt, hang up and call 100",
        ],
    },
    VerificationCard {
        title: "Bank Safety",
        subtitle: "Protect your money from scammers",
        items: [
            "Your bank NEVER asks for OTP on calls",
            "Never share your ATM PIN with anyone",
            "Freeze your account: call your bank helpline",
            "Report fraud: 1930 (Cyber Crime Helpline)",
        ],
    },
    VerificationCard {
        title: "Report a Scam",
        subtitle: "Reached here in time? Report now!",
        items: [
            "National Cyber Crime: cybercrime.gov.in",
            "Helpline: 1930",
            "WhatsApp Scams: report in app",
            "Tell your family immediately",
        ],
    },
];

pub const EMERGENCY_NUMBERS: [EmergencyNumber; 4] = [
    EmergencyNumber {
        label: "Police",
        number: "100",
    },
    EmergencyNumber {
        label: "Cyber Crime",
        number: "1930",
    },
    EmergencyNumber {
        label: "Women Safety",
        number: "1091",
    },
    EmergencyNumber {
        label: "Ambulance",
        number: "108",
    },
];

/// Red flags listed on the demo intervention screen.
pub const SCAM_INDICATORS: [&str; 3] = [
    "CBI does NOT make video calls",
    "This is a common fraud tactic",
    "You are NOT under arrest",
];
