// ============================================================================
// SERVICES
// ============================================================================
//
//   - token_service : émission / consommation des tokens d'invitation
//   - notifier : envoi des emails (trait + implémentations)
//   - account_service : création des comptes du personnel, connexion
//   - propiedad_service : biens immobiliers et catalogue public
//
// ============================================================================

pub mod account_service;
pub mod notifier;
pub mod propiedad_service;
pub mod token_service;
