//! High-level SPL Token client bound to one mint.

use sol_core::{Instruction, Pubkey, Signature, Signer};
use sol_programs::spl_token::{self, AuthorityType, Mint, TokenAccount, ACCOUNT_LEN, MINT_LEN, MULTISIG_LEN};
use sol_programs::{associated_token, system_program};
use sol_rpc::{RpcTransport, TokenAccountsFilter, UiAccountEncoding, UiTokenAmount};

use crate::error::ClientError;
use crate::sender::TransactionSender;

/// Who signs for a token authority.
pub enum Authority<'s> {
    /// The authority key itself signs.
    Single(&'s dyn Signer),
    /// An SPL multisig account, with enough of its members signing.
    Multisig {
        account: Pubkey,
        signers: Vec<&'s dyn Signer>,
    },
}

impl<'s> Authority<'s> {
    pub fn pubkey(&self) -> Pubkey {
        match self {
            Self::Single(signer) => signer.pubkey(),
            Self::Multisig { account, .. } => *account,
        }
    }

    /// Keys passed to the token program as multisig signers.
    fn multisig_keys(&self) -> Vec<Pubkey> {
        match self {
            Self::Single(_) => Vec::new(),
            Self::Multisig { signers, .. } => {
                let mut keys: Vec<Pubkey> = Vec::with_capacity(signers.len());
                for key in signers.iter().map(|s| s.pubkey()) {
                    if !keys.contains(&key) {
                        keys.push(key);
                    }
                }
                keys
            }
        }
    }

    fn signers(&self) -> Vec<&'s dyn Signer> {
        match self {
            Self::Single(signer) => vec![*signer],
            Self::Multisig { signers, .. } => signers.clone(),
        }
    }
}

pub struct TokenClient<'a, T: RpcTransport> {
    sender: TransactionSender<'a, T>,
    mint: Pubkey,
    program_id: Pubkey,
    payer: &'a dyn Signer,
}

impl<'a, T: RpcTransport> TokenClient<'a, T> {
    pub fn new(sender: TransactionSender<'a, T>, mint: Pubkey, program_id: Pubkey, payer: &'a dyn Signer) -> Self {
        Self {
            sender,
            mint,
            program_id,
            payer,
        }
    }

    pub fn mint(&self) -> &Pubkey {
        &self.mint
    }

    pub fn program_id(&self) -> &Pubkey {
        &self.program_id
    }

    pub fn sender(&self) -> &TransactionSender<'a, T> {
        &self.sender
    }

    /// Allocate and initialize a mint at `mint`'s key, funded rent-exempt by
    /// `payer`, and return a client for it.
    #[allow(clippy::too_many_arguments)]
    pub async fn create_mint(
        sender: TransactionSender<'a, T>,
        payer: &'a dyn Signer,
        mint: &dyn Signer,
        mint_authority: &Pubkey,
        freeze_authority: Option<&Pubkey>,
        decimals: u8,
        program_id: Pubkey,
    ) -> Result<Self, ClientError> {
        let mint_key = mint.pubkey();
        let lamports = sender
            .client()
            .get_minimum_balance_for_rent_exemption(MINT_LEN, None)
            .await?;
        let instructions = [
            system_program::create_account(&payer.pubkey(), &mint_key, lamports, MINT_LEN as u64, &program_id),
            spl_token::initialize_mint(&program_id, &mint_key, mint_authority, freeze_authority, decimals)?,
        ];
        let signature = sender.send_and_confirm(&instructions, payer, &[mint]).await?;
        tracing::info!(mint = %mint_key, decimals, %signature, "created mint");
        Ok(Self::new(sender, mint_key, program_id, payer))
    }

    async fn send(&self, instructions: &[Instruction], signers: &[&dyn Signer]) -> Result<Signature, ClientError> {
        self.sender.send_and_confirm(instructions, self.payer, signers).await
    }

    /// Allocate and initialize a token account for this mint at `account`'s
    /// key.
    pub async fn create_account(&self, account: &dyn Signer, owner: &Pubkey) -> Result<Pubkey, ClientError> {
        let key = account.pubkey();
        let lamports = self
            .sender
            .client()
            .get_minimum_balance_for_rent_exemption(ACCOUNT_LEN, None)
            .await?;
        let instructions = [
            system_program::create_account(&self.payer.pubkey(), &key, lamports, ACCOUNT_LEN as u64, &self.program_id),
            spl_token::initialize_account(&self.program_id, &key, &self.mint, owner)?,
        ];
        let signature = self.send(&instructions, &[account]).await?;
        tracing::info!(account = %key, %owner, %signature, "created token account");
        Ok(key)
    }

    /// Allocate a multisig account requiring `m` of `signers`.
    pub async fn create_multisig(
        &self,
        multisig: &dyn Signer,
        signers: &[&Pubkey],
        m: u8,
    ) -> Result<Pubkey, ClientError> {
        let key = multisig.pubkey();
        let lamports = self
            .sender
            .client()
            .get_minimum_balance_for_rent_exemption(MULTISIG_LEN, None)
            .await?;
        let instructions = [
            system_program::create_account(&self.payer.pubkey(), &key, lamports, MULTISIG_LEN as u64, &self.program_id),
            spl_token::initialize_multisig(&self.program_id, &key, signers, m)?,
        ];
        self.send(&instructions, &[multisig]).await?;
        Ok(key)
    }

    pub fn associated_token_address(&self, owner: &Pubkey) -> Result<Pubkey, ClientError> {
        Ok(associated_token::get_associated_token_address_with_program_id(
            owner,
            &self.mint,
            &self.program_id,
        )?)
    }

    pub async fn create_associated_token_account(&self, owner: &Pubkey) -> Result<Pubkey, ClientError> {
        let address = self.associated_token_address(owner)?;
        let ix = associated_token::create_associated_token_account(
            &self.payer.pubkey(),
            owner,
            &self.mint,
            &self.program_id,
        )?;
        let signature = self.send(&[ix], &[]).await?;
        tracing::info!(account = %address, %owner, %signature, "created associated token account");
        Ok(address)
    }

    /// Return `owner`'s associated account for this mint, creating it when
    /// missing. An existing account for another mint or owner is an error.
    pub async fn get_or_create_associated_account(&self, owner: &Pubkey) -> Result<Pubkey, ClientError> {
        let address = self.associated_token_address(owner)?;
        if let Some(data) = self.fetch_owned(&address).await? {
            let account = self.decode_account(&address, &data)?;
            if account.owner != *owner {
                return Err(ClientError::InvalidAccountData(format!(
                    "associated account {address} is owned by {}",
                    account.owner
                )));
            }
            tracing::debug!(account = %address, %owner, "associated token account exists");
            return Ok(address);
        }
        let ix = associated_token::create_associated_token_account_idempotent(
            &self.payer.pubkey(),
            owner,
            &self.mint,
            &self.program_id,
        )?;
        let signature = self.send(&[ix], &[]).await?;
        tracing::info!(account = %address, %owner, %signature, "created associated token account");
        Ok(address)
    }

    pub async fn transfer(
        &self,
        source: &Pubkey,
        destination: &Pubkey,
        authority: &Authority<'_>,
        amount: u64,
    ) -> Result<Signature, ClientError> {
        let keys = authority.multisig_keys();
        let ix = spl_token::transfer(
            &self.program_id,
            source,
            destination,
            &authority.pubkey(),
            &keys.iter().collect::<Vec<_>>(),
            amount,
        )?;
        let signature = self.send(&[ix], &authority.signers()).await?;
        tracing::info!(%source, %destination, amount, %signature, "token transfer");
        Ok(signature)
    }

    pub async fn transfer_checked(
        &self,
        source: &Pubkey,
        destination: &Pubkey,
        authority: &Authority<'_>,
        amount: u64,
        decimals: u8,
    ) -> Result<Signature, ClientError> {
        let keys = authority.multisig_keys();
        let ix = spl_token::transfer_checked(
            &self.program_id,
            source,
            &self.mint,
            destination,
            &authority.pubkey(),
            &keys.iter().collect::<Vec<_>>(),
            amount,
            decimals,
        )?;
        let signature = self.send(&[ix], &authority.signers()).await?;
        tracing::info!(%source, %destination, amount, decimals, %signature, "checked token transfer");
        Ok(signature)
    }

    pub async fn mint_to(
        &self,
        destination: &Pubkey,
        mint_authority: &Authority<'_>,
        amount: u64,
    ) -> Result<Signature, ClientError> {
        let keys = mint_authority.multisig_keys();
        let ix = spl_token::mint_to(
            &self.program_id,
            &self.mint,
            destination,
            &mint_authority.pubkey(),
            &keys.iter().collect::<Vec<_>>(),
            amount,
        )?;
        let signature = self.send(&[ix], &mint_authority.signers()).await?;
        tracing::info!(mint = %self.mint, %destination, amount, %signature, "minted tokens");
        Ok(signature)
    }

    pub async fn burn(&self, account: &Pubkey, owner: &Authority<'_>, amount: u64) -> Result<Signature, ClientError> {
        let keys = owner.multisig_keys();
        let ix = spl_token::burn(
            &self.program_id,
            account,
            &self.mint,
            &owner.pubkey(),
            &keys.iter().collect::<Vec<_>>(),
            amount,
        )?;
        let signature = self.send(&[ix], &owner.signers()).await?;
        tracing::info!(%account, amount, %signature, "burned tokens");
        Ok(signature)
    }

    pub async fn approve(
        &self,
        source: &Pubkey,
        delegate: &Pubkey,
        owner: &Authority<'_>,
        amount: u64,
    ) -> Result<Signature, ClientError> {
        let keys = owner.multisig_keys();
        let ix = spl_token::approve(
            &self.program_id,
            source,
            delegate,
            &owner.pubkey(),
            &keys.iter().collect::<Vec<_>>(),
            amount,
        )?;
        let signature = self.send(&[ix], &owner.signers()).await?;
        tracing::info!(%source, %delegate, amount, %signature, "approved delegate");
        Ok(signature)
    }

    pub async fn revoke(&self, source: &Pubkey, owner: &Authority<'_>) -> Result<Signature, ClientError> {
        let keys = owner.multisig_keys();
        let ix = spl_token::revoke(&self.program_id, source, &owner.pubkey(), &keys.iter().collect::<Vec<_>>())?;
        let signature = self.send(&[ix], &owner.signers()).await?;
        tracing::info!(%source, %signature, "revoked delegate");
        Ok(signature)
    }

    /// Close `account`, sending its lamports to `destination`. The token
    /// balance must be zero.
    pub async fn close_account(
        &self,
        account: &Pubkey,
        destination: &Pubkey,
        owner: &Authority<'_>,
    ) -> Result<Signature, ClientError> {
        let keys = owner.multisig_keys();
        let ix = spl_token::close_account(
            &self.program_id,
            account,
            destination,
            &owner.pubkey(),
            &keys.iter().collect::<Vec<_>>(),
        )?;
        let signature = self.send(&[ix], &owner.signers()).await?;
        tracing::info!(%account, %destination, %signature, "closed token account");
        Ok(signature)
    }

    pub async fn freeze(&self, account: &Pubkey, freeze_authority: &Authority<'_>) -> Result<Signature, ClientError> {
        let keys = freeze_authority.multisig_keys();
        let ix = spl_token::freeze_account(
            &self.program_id,
            account,
            &self.mint,
            &freeze_authority.pubkey(),
            &keys.iter().collect::<Vec<_>>(),
        )?;
        let signature = self.send(&[ix], &freeze_authority.signers()).await?;
        tracing::info!(%account, %signature, "froze token account");
        Ok(signature)
    }

    pub async fn thaw(&self, account: &Pubkey, freeze_authority: &Authority<'_>) -> Result<Signature, ClientError> {
        let keys = freeze_authority.multisig_keys();
        let ix = spl_token::thaw_account(
            &self.program_id,
            account,
            &self.mint,
            &freeze_authority.pubkey(),
            &keys.iter().collect::<Vec<_>>(),
        )?;
        let signature = self.send(&[ix], &freeze_authority.signers()).await?;
        tracing::info!(%account, %signature, "thawed token account");
        Ok(signature)
    }

    /// Change `authority_type` on `owned` (the mint or a token account).
    /// `None` removes the authority for good.
    pub async fn set_authority(
        &self,
        owned: &Pubkey,
        new_authority: Option<&Pubkey>,
        authority_type: AuthorityType,
        current: &Authority<'_>,
    ) -> Result<Signature, ClientError> {
        let keys = current.multisig_keys();
        let ix = spl_token::set_authority(
            &self.program_id,
            owned,
            new_authority,
            authority_type,
            &current.pubkey(),
            &keys.iter().collect::<Vec<_>>(),
        )?;
        let signature = self.send(&[ix], &current.signers()).await?;
        tracing::info!(%owned, ?authority_type, new_authority = ?new_authority, %signature, "set authority");
        Ok(signature)
    }

    pub async fn get_balance(&self, account: &Pubkey) -> Result<UiTokenAmount, ClientError> {
        let response = self.sender.client().get_token_account_balance(account, None).await?;
        Ok(response.value)
    }

    /// Data of `address`, or `None` if it does not exist. An account owned
    /// by another program is an error.
    async fn fetch_owned(&self, address: &Pubkey) -> Result<Option<Vec<u8>>, ClientError> {
        let response = self
            .sender
            .client()
            .get_account_info(address, None, UiAccountEncoding::Base64, None)
            .await?;
        let Some(account) = response.value else {
            return Ok(None);
        };
        if account.owner != self.program_id {
            return Err(ClientError::InvalidAccountData(format!(
                "{address} is owned by {}, expected {}",
                account.owner, self.program_id
            )));
        }
        Ok(Some(account.decode_data()?))
    }

    fn decode_account(&self, address: &Pubkey, data: &[u8]) -> Result<TokenAccount, ClientError> {
        let state = TokenAccount::unpack(data)?;
        if state.mint != self.mint {
            return Err(ClientError::InvalidAccountData(format!(
                "{address} holds mint {}, expected {}",
                state.mint, self.mint
            )));
        }
        Ok(state)
    }

    pub async fn get_mint_info(&self) -> Result<Mint, ClientError> {
        let data = self
            .fetch_owned(&self.mint)
            .await?
            .ok_or(ClientError::AccountNotFound(self.mint))?;
        Ok(Mint::unpack(&data)?)
    }

    /// Fetch and decode a token account of this mint.
    pub async fn get_account_info(&self, account: &Pubkey) -> Result<TokenAccount, ClientError> {
        let data = self
            .fetch_owned(account)
            .await?
            .ok_or(ClientError::AccountNotFound(*account))?;
        self.decode_account(account, &data)
    }

    /// Token accounts of this mint owned by `owner`.
    pub async fn get_accounts_by_owner(&self, owner: &Pubkey) -> Result<Vec<(Pubkey, TokenAccount)>, ClientError> {
        let response = self
            .sender
            .client()
            .get_token_accounts_by_owner(
                owner,
                &TokenAccountsFilter::Mint(self.mint),
                None,
                UiAccountEncoding::Base64,
            )
            .await?;
        response
            .value
            .into_iter()
            .map(|keyed| -> Result<_, ClientError> {
                let data = keyed.account.decode_data()?;
                Ok((keyed.pubkey, TokenAccount::unpack(&data)?))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sol_core::Keypair;

    #[test]
    fn single_authority_signs_for_itself() {
        let owner = Keypair::from_seed(&[4u8; 32]);
        let authority = Authority::Single(&owner);
        assert_eq!(authority.pubkey(), owner.pubkey());
        assert!(authority.multisig_keys().is_empty());
        assert_eq!(authority.signers().len(), 1);
    }

    #[test]
    fn multisig_keys_are_deduplicated() {
        let a = Keypair::from_seed(&[5u8; 32]);
        let b = Keypair::from_seed(&[6u8; 32]);
        let account = Pubkey::new_from_array([9u8; 32]);
        let authority = Authority::Multisig {
            account,
            signers: vec![&a as &dyn Signer, &b, &a],
        };
        assert_eq!(authority.pubkey(), account);
        assert_eq!(authority.multisig_keys(), vec![a.pubkey(), b.pubkey()]);
    }
}
